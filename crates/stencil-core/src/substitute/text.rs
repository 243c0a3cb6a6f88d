//! Plain substitution of placeholder tokens in text content

use super::matcher::Substitutions;

/// Replace every token of every substitution, in input order
///
/// Returns `None` when nothing matched. Because keys are applied one after
/// another, a value containing another key's token is expanded by later
/// substitutions but not by earlier ones.
pub fn rewrite_text(content: &str, substitutions: &Substitutions) -> Option<String> {
    let mut current = content.to_string();
    let mut changed = false;

    for substitution in substitutions.iter() {
        if substitution.count(&current) == 0 {
            continue;
        }
        let replaced = substitution.apply(&current).into_owned();
        if replaced != current {
            current = replaced;
            changed = true;
        }
    }

    changed.then_some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::UserInputs;
    use crate::substitute::TokenStyle;

    fn subs(pairs: &[(&str, &str)], style: TokenStyle) -> Substitutions {
        let inputs: UserInputs = pairs.iter().copied().collect();
        Substitutions::from_inputs(&inputs, style)
    }

    #[test]
    fn test_replaces_all_tokens() {
        let s = subs(
            &[("PROJECT_NAME", "Demo"), ("USERNAME", "john")],
            TokenStyle::Delimited,
        );
        let content = "# {{PROJECT_NAME}}\nby {{USERNAME}} ({{PROJECT_NAME}})";
        let out = rewrite_text(content, &s).unwrap();
        assert_eq!(out, "# Demo\nby john (Demo)");
    }

    #[test]
    fn test_untouched_content_reports_no_change() {
        let s = subs(&[("PROJECT_NAME", "Demo")], TokenStyle::Delimited);
        assert!(rewrite_text("nothing to see", &s).is_none());
        assert!(rewrite_text("PROJECT_NAME without braces", &s).is_none());
    }

    #[test]
    fn test_identity_replacement_is_not_a_change() {
        let s = subs(&[("NAME", "NAME")], TokenStyle::Bare);
        assert!(rewrite_text("NAME", &s).is_none());
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let s = subs(
            &[("PROJECT_NAME", "Demo"), ("PACKAGE_NAME", "@john/demo")],
            TokenStyle::Delimited,
        );
        let once = rewrite_text("{{PACKAGE_NAME}} - {{PROJECT_NAME}}", &s).unwrap();
        assert_eq!(once, "@john/demo - Demo");
        assert!(rewrite_text(&once, &s).is_none());
    }

    #[test]
    fn test_order_dependency_between_keys() {
        // NAME runs first and eats part of PROJECT_NAME
        let s = subs(&[("NAME", "x"), ("PROJECT_NAME", "Demo")], TokenStyle::Bare);
        assert_eq!(rewrite_text("PROJECT_NAME", &s).unwrap(), "PROJECT_x");

        let s = subs(&[("PROJECT_NAME", "Demo"), ("NAME", "x")], TokenStyle::Bare);
        assert_eq!(rewrite_text("PROJECT_NAME", &s).unwrap(), "Demo");
    }
}
