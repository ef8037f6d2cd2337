use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};

use tracing::{event, Level};

use super::source::SourcePosition;
use super::symbol::SymbolName;

/// The result of looking up a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    Defined(u16),
    /// Declared with `EXTRN`; its value is supplied by the linker, so
    /// the assembler uses zero.
    External,
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Definition {
    value: u16,
    position: SourcePosition,
}

/// What happened when a symbol was defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Redefinition {
    New,
    /// Defined before, with the same value.
    Same,
    /// Defined before with a different value, at the given position.
    Changed {
        previous_value: u16,
        previous_position: SourcePosition,
    },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SymbolTable {
    definitions: BTreeMap<SymbolName, Definition>,
    externals: BTreeSet<SymbolName>,
}

impl SymbolTable {
    /// Bind `name` to `value`. The last definition wins.
    pub(crate) fn define(
        &mut self,
        name: SymbolName,
        value: u16,
        position: SourcePosition,
    ) -> Redefinition {
        event!(Level::DEBUG, "defining {name} = ${value:04X}");
        match self.definitions.insert(name, Definition { value, position }) {
            None => Redefinition::New,
            Some(previous) if previous.value == value => Redefinition::Same,
            Some(previous) => Redefinition::Changed {
                previous_value: previous.value,
                previous_position: previous.position,
            },
        }
    }

    pub(crate) fn declare_external(&mut self, name: SymbolName) {
        self.externals.insert(name);
    }

    pub(crate) fn lookup(&self, name: &SymbolName) -> Lookup {
        match self.definitions.get(name) {
            Some(def) => Lookup::Defined(def.value),
            None if self.externals.contains(name) => Lookup::External,
            None => Lookup::Undefined,
        }
    }

    pub(crate) fn is_defined(&self, name: &SymbolName) -> bool {
        self.definitions.contains_key(name)
    }

    /// The defined symbols and their values, in name order.
    pub(crate) fn values(&self) -> BTreeMap<SymbolName, u16> {
        self.definitions
            .iter()
            .map(|(name, def)| (name.clone(), def.value))
            .collect()
    }
}

impl Display for SymbolTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (name, def) in &self.definitions {
            writeln!(f, "{name:16} = ${:04X}", def.value)?;
        }
        for name in self.externals.iter().filter(|n| !self.definitions.contains_key(*n)) {
            writeln!(f, "{name:16} = EXTERNAL")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: u32) -> SourcePosition {
        SourcePosition::new(line, 1)
    }

    #[test]
    fn test_define_and_lookup() {
        let mut t = SymbolTable::default();
        assert_eq!(t.define(SymbolName::from("start"), 0x1000, pos(1)), Redefinition::New);
        assert_eq!(t.lookup(&SymbolName::from("START")), Lookup::Defined(0x1000));
        assert_eq!(t.lookup(&SymbolName::from("NOWHERE")), Lookup::Undefined);
    }

    #[test]
    fn test_redefinition() {
        let mut t = SymbolTable::default();
        t.define(SymbolName::from("X1"), 1, pos(1));
        assert_eq!(t.define(SymbolName::from("X1"), 1, pos(2)), Redefinition::Same);
        assert_eq!(
            t.define(SymbolName::from("X1"), 2, pos(3)),
            Redefinition::Changed {
                previous_value: 1,
                previous_position: pos(2)
            }
        );
        assert_eq!(t.lookup(&SymbolName::from("X1")), Lookup::Defined(2));
    }

    #[test]
    fn test_externals() {
        let mut t = SymbolTable::default();
        t.declare_external(SymbolName::from("PRINT"));
        assert_eq!(t.lookup(&SymbolName::from("print")), Lookup::External);
        assert!(!t.is_defined(&SymbolName::from("PRINT")));
        assert!(t.values().is_empty());
    }

    #[test]
    fn test_display_is_sorted() {
        let mut t = SymbolTable::default();
        t.define(SymbolName::from("ZED"), 0x20, pos(1));
        t.define(SymbolName::from("ALPHA"), 0x1234, pos(2));
        t.declare_external(SymbolName::from("COUT"));
        assert_eq!(
            t.to_string(),
            "ALPHA            = $1234\nZED              = $0020\nCOUT             = EXTERNAL\n"
        );
    }
}
