use tracing::trace;

use crate::error::Result;
use crate::msg::OfpBody;
use crate::mutable::Editor;
use crate::structure::HelloElement;
use crate::version::{self, ProtocolVersion};
use crate::wire::{PacketReader, PacketWriter};

/// Hello body. Elements exist from 1.3 on; earlier versions send an empty
/// body and ignore whatever a peer appends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hello {
    elements: Vec<HelloElement>,
}

impl Hello {
    pub fn elements(&self) -> &[HelloElement] {
        &self.elements
    }
}

impl OfpBody for Hello {
    fn size_of(&self, pv: ProtocolVersion) -> usize {
        if pv.lt(ProtocolVersion::V1_3) {
            return 0;
        }
        self.elements.iter().map(HelloElement::size_of).sum()
    }

    fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<Hello> {
        let mut elements = vec![];
        if pv.lt(ProtocolVersion::V1_3) {
            let extra = bytes.readable_bytes();
            if extra > 0 {
                trace!(version = %pv, extra, "ignoring hello payload");
                bytes.skip(extra)?;
            }
        } else {
            // an element header is four bytes; a shorter tail is left for the
            // caller to report
            while bytes.readable_bytes() >= 4 {
                elements.push(HelloElement::parse(bytes, pv)?);
            }
        }
        Ok(Hello { elements: elements })
    }

    fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        if pv.lt(ProtocolVersion::V1_3) {
            return Ok(());
        }
        for elem in &self.elements {
            elem.marshal(bytes)?;
        }
        Ok(())
    }

    fn validate(&self, _pv: ProtocolVersion) -> Result<()> {
        for elem in &self.elements {
            elem.validate()?;
        }
        Ok(())
    }

    fn summary(&self) -> String {
        if self.elements.is_empty() {
            return String::new();
        }
        let elems: Vec<String> = self.elements.iter().map(|e| e.to_string()).collect();
        format!("elems={}", elems.join(""))
    }
}

impl<'a> Editor<'a, Hello> {
    /// Appends a hello element. Only 1.3 hellos carry elements.
    pub fn add_element(&mut self, element: HelloElement) -> Result<&mut Self> {
        version::ver_min_13(self.version(), "hello element")?;
        version::same_version(&[self.version(), HelloElement::VERSION], "hello element")?;
        element.validate()?;
        self.body_mut().elements.push(element);
        Ok(self)
    }

    pub fn clear_elements(&mut self) -> &mut Self {
        self.body_mut().elements.clear();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::ProtocolVersion::*;
    use std::io::Cursor;

    #[test]
    fn elements_only_at_1_3() {
        let mut hello = Hello::default();
        {
            let mut ed = Editor::new(V1_0, &mut hello);
            let err = ed.add_element(HelloElement::version_bitmap(&[V1_0])).unwrap_err();
            assert!(err.is_version_mismatch());
        }
        assert!(hello.elements().is_empty());

        let mut ed = Editor::new(V1_3, &mut hello);
        ed.add_element(HelloElement::version_bitmap(&[V1_0, V1_3])).unwrap();
        assert_eq!(hello.size_of(V1_3), 8);
    }

    #[test]
    fn pre_1_3_payload_is_ignored() {
        let mut r = Cursor::new(vec![0, 1, 0, 8, 0, 0, 0, 0x12]);
        let hello = Hello::parse(&mut r, V1_0).unwrap();
        assert!(hello.elements().is_empty());
        assert_eq!(r.readable_bytes(), 0);
    }

    #[test]
    fn parses_1_3_elements() {
        let mut r = Cursor::new(vec![0, 1, 0, 8, 0, 0, 0, 0x12, 0, 9, 0, 4, 0, 0, 0, 0]);
        let hello = Hello::parse(&mut r, V1_3).unwrap();
        assert_eq!(hello.elements().len(), 2);
        assert_eq!(hello.elements()[0], HelloElement::version_bitmap(&[V1_0, V1_3]));
        assert_eq!(hello.summary(), "elems={VERSION_BITMAP:[1.0,1.3]}{UNKNOWN:type=0x0009,len=0}");
    }

    #[test]
    fn empty_bitmap_is_rejected() {
        let mut hello = Hello::default();
        let mut ed = Editor::new(V1_3, &mut hello);
        assert!(ed.add_element(HelloElement::version_bitmap(&[])).is_err());
    }
}
