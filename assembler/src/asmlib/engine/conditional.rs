//! The conditional-assembly state: whether statements are currently
//! being assembled, and the state to return to at each `FIN`.
use super::super::directive::Directive;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConditionStack {
    enabled: bool,
    parents: Vec<bool>,
}

impl Default for ConditionStack {
    fn default() -> ConditionStack {
        ConditionStack {
            enabled: true,
            parents: Vec::new(),
        }
    }
}

impl ConditionStack {
    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the block enclosing the innermost open block is being
    /// assembled.
    pub(crate) fn outer_enabled(&self) -> bool {
        self.parents.last().copied().unwrap_or(true)
    }

    pub(crate) fn depth(&self) -> usize {
        self.parents.len()
    }

    /// Open a block.  A block inside a disabled block is disabled
    /// whatever its condition.
    pub(crate) fn open(&mut self, condition: bool) {
        self.parents.push(self.enabled);
        self.enabled = self.enabled && condition;
    }

    /// Handle `ELSE`.  Returns false if no block is open, in which
    /// case nothing changes.
    pub(crate) fn flip(&mut self) -> bool {
        match self.parents.last() {
            Some(&parent) => {
                self.enabled = parent && !self.enabled;
                true
            }
            None => false,
        }
    }

    /// Handle `FIN`.  Returns false if no block is open, in which
    /// case nothing changes.
    pub(crate) fn close(&mut self) -> bool {
        match self.parents.pop() {
            Some(parent) => {
                self.enabled = parent;
                true
            }
            None => false,
        }
    }
}

/// Does the condition of a block-opening directive hold for
/// `value`?  `IFLT` and `IFLE` take the value as signed.
pub(crate) fn holds(directive: Directive, value: u16) -> bool {
    let signed = i16::from_le_bytes(value.to_le_bytes());
    match directive {
        Directive::IfEq => value == 0,
        Directive::IfGt => value > 0,
        Directive::IfGe => true,
        Directive::IfLt => signed < 0,
        Directive::IfLe => signed <= 0,
        _ => value != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_never_reenables() {
        let mut c = ConditionStack::default();
        c.open(false);
        assert!(!c.enabled());
        c.open(true);
        assert!(!c.enabled());
        assert!(c.flip());
        assert!(!c.enabled());
        assert!(c.close());
        assert!(!c.enabled());
        assert!(c.flip());
        assert!(c.enabled());
        assert!(c.close());
        assert!(c.enabled());
        assert_eq!(c.depth(), 0);
    }

    #[test]
    fn test_stray_else_and_fin() {
        let mut c = ConditionStack::default();
        assert!(!c.flip());
        assert!(!c.close());
        assert!(c.enabled());
        assert_eq!(c, ConditionStack::default());
    }

    #[test]
    fn test_outer_enabled() {
        let mut c = ConditionStack::default();
        assert!(c.outer_enabled());
        c.open(false);
        assert!(c.outer_enabled());
        c.open(true);
        assert!(!c.outer_enabled());
    }

    #[test]
    fn test_conditions() {
        assert!(holds(Directive::Do, 1));
        assert!(!holds(Directive::Do, 0));
        assert!(holds(Directive::IfNe, 5));
        assert!(holds(Directive::IfEq, 0));
        assert!(!holds(Directive::IfEq, 2));
        assert!(holds(Directive::IfGt, 10));
        assert!(!holds(Directive::IfGt, 0));
        assert!(holds(Directive::IfGe, 0));
        assert!(holds(Directive::IfLt, 0xFFFF));
        assert!(!holds(Directive::IfLt, 0));
        assert!(holds(Directive::IfLe, 0));
        assert!(holds(Directive::IfLe, 0x8000));
        assert!(!holds(Directive::IfLe, 0x7FFF));
    }
}
