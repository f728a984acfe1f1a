//! Code actions derived from diagnostic fix suggestions.

use oas_position_tracking::WireRange;
use oas_rules::{Diagnostic, FilePatch};
use serde::Serialize;

/// A quick-fix action offered to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeAction {
    pub title: String,
    /// The fix in the engine's patch dialect.
    pub patch: FilePatch,
    /// The diagnostic the action resolves.
    pub diagnostic: Diagnostic,
    /// Quick fixes for errors are preferred by clients.
    pub is_preferred: bool,
}

/// Actions for the diagnostics intersecting `range` in `uri`. Passing
/// `None` as the range returns actions for the whole document.
pub fn code_actions(
    diagnostics: &[Diagnostic],
    uri: &str,
    range: Option<WireRange>,
) -> Vec<CodeAction> {
    diagnostics
        .iter()
        .filter(|d| d.uri == uri)
        .filter(|d| range.is_none_or(|r| ranges_intersect(d.range, r)))
        .flat_map(|d| {
            d.suggest.iter().map(move |s| CodeAction {
                title: s.title.clone(),
                patch: s.fix.clone(),
                diagnostic: d.clone(),
                is_preferred: d.suggest.len() == 1,
            })
        })
        .collect()
}

fn ranges_intersect(a: WireRange, b: WireRange) -> bool {
    !(a.end < b.start || b.end < a.start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oas_graph::DocumentSet;
    use oas_parser::load_document;
    use oas_position_tracking::WirePosition;
    use oas_rules::{PatchOpKind, RuleEngine};
    use oas_workspace_index::{CancelToken, Project};

    fn diagnostics_for(text: &str) -> Vec<Diagnostic> {
        let mut docs = DocumentSet::new();
        docs.insert(load_document("file:///api.yaml", text));
        let project = Project::build(docs, &CancelToken::new());
        let uris = project.document_uris();
        RuleEngine::with_builtins().run(&project, &uris, &CancelToken::new()).diagnostics
    }

    const API: &str = concat!(
        "openapi: 3.1.0\n",
        "paths:\n",
        "  /User_Accounts:\n",
        "    get:\n",
        "      responses:\n",
        "        '400': { description: e }\n",
        "        '401': { description: e }\n",
        "        '403': { description: e }\n",
        "        '429': { description: e }\n",
        "        '500': { description: e }\n",
    );

    #[test]
    fn test_kebab_fix_materializes_as_action() {
        let diagnostics = diagnostics_for(API);
        let actions = code_actions(&diagnostics, "file:///api.yaml", None);
        assert_eq!(actions.len(), 1);
        let action = &actions[0];
        assert_eq!(action.title, "Rename to '/user-accounts'");
        assert!(action.is_preferred);
        assert_eq!(action.patch.ops.len(), 2);
        assert_eq!(action.patch.ops[0].op, PatchOpKind::Add);
        assert_eq!(action.patch.ops[0].path, "#/paths/~1user-accounts");
        assert_eq!(action.patch.ops[1].op, PatchOpKind::Remove);
        assert_eq!(action.patch.ops[1].path, "#/paths/~1User_Accounts");
    }

    #[test]
    fn test_range_filter() {
        let diagnostics = diagnostics_for(API);
        // A range on line 0 does not touch the path key on line 2.
        let far = WireRange::new(WirePosition::new(0, 0), WirePosition::new(0, 5));
        assert!(code_actions(&diagnostics, "file:///api.yaml", Some(far)).is_empty());
        let near = WireRange::new(WirePosition::new(2, 3), WirePosition::new(2, 4));
        assert_eq!(code_actions(&diagnostics, "file:///api.yaml", Some(near)).len(), 1);
    }

    #[test]
    fn test_other_uri_has_no_actions() {
        let diagnostics = diagnostics_for(API);
        assert!(code_actions(&diagnostics, "file:///other.yaml", None).is_empty());
    }
}
