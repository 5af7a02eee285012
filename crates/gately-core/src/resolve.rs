// ── Code range resolution ──
//
// Maps a normalized scan code to the definition that claims it. First
// structural match in supplied order is authoritative; overlap between
// selectors is a loader problem, not resolved here.

use std::sync::Arc;

use crate::model::{CodeDefinition, ScanCode};

/// Find the definition claiming `code`.
///
/// Inactive definitions are skipped. Pure and deterministic: identical
/// inputs always yield the identical match.
pub fn resolve<'a>(
    code: &ScanCode,
    definitions: &'a [Arc<CodeDefinition>],
) -> Option<&'a Arc<CodeDefinition>> {
    definitions
        .iter()
        .filter(|def| def.active)
        .find(|def| def.selector.matches(code))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::CodeSelector;

    fn def(id: &str, selector: &str, active: bool) -> Arc<CodeDefinition> {
        Arc::new(CodeDefinition {
            id: id.into(),
            name: id.into(),
            description: None,
            selector: CodeSelector::parse(selector).unwrap(),
            color: None,
            duration_minutes: 60,
            price: 100,
            price_per_extra_minute: 5,
            active,
        })
    }

    fn code(s: &str) -> ScanCode {
        ScanCode::parse(s).unwrap()
    }

    #[test]
    fn range_wildcard_and_exact_all_resolve() {
        let defs = vec![
            def("range", "10000000-19999999", true),
            def("wild", "2000*", true),
            def("exact", "8594001234567", true),
        ];

        assert_eq!(resolve(&code("15000000"), &defs).unwrap().id, "range");
        assert_eq!(resolve(&code("20001234"), &defs).unwrap().id, "wild");
        assert_eq!(resolve(&code("8594001234567"), &defs).unwrap().id, "exact");
        assert!(resolve(&code("99999999"), &defs).is_none());
    }

    #[test]
    fn first_match_in_supplied_order_wins() {
        // Overlapping on purpose: precedence is iteration order.
        let defs = vec![def("narrow", "1500*", true), def("broad", "1*", true)];
        assert_eq!(resolve(&code("15001234"), &defs).unwrap().id, "narrow");

        let reversed = vec![def("broad", "1*", true), def("narrow", "1500*", true)];
        assert_eq!(resolve(&code("15001234"), &reversed).unwrap().id, "broad");
    }

    #[test]
    fn inactive_definitions_are_skipped() {
        let defs = vec![def("off", "1*", false), def("on", "1*", true)];
        assert_eq!(resolve(&code("10000000"), &defs).unwrap().id, "on");
    }

    #[test]
    fn resolution_is_repeatable() {
        let defs = vec![def("a", "1000-1999", true), def("b", "2*", true)];
        let first = resolve(&code("1500"), &defs).map(|d| d.id.clone());
        for _ in 0..10 {
            assert_eq!(resolve(&code("1500"), &defs).map(|d| d.id.clone()), first);
        }
    }
}
