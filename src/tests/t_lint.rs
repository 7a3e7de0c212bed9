use super::*;
use indoc::indoc;

fn lint_source(source: &str) -> Vec<Diagnostic> {
    lint_with_config(source, &Config::default())
}

fn lint_with_config(source: &str, config: &Config) -> Vec<Diagnostic> {
    let program = crate::parse::parse(source, "test.vcl").expect("failed to parse");
    lint(&program, config)
}

fn rules_of(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.rule.as_str()).collect()
}

#[test]
fn test_clean_program_has_no_diagnostics() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            if (req.http.Host == "example.com") {
                set req.http.X-Site = "main";
            }
            return(lookup);
        }
    "#});

    assert!(diagnostics.is_empty(), "unexpected: {:?}", diagnostics);
}

#[test]
fn test_set_out_of_scope() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            set beresp.ttl = 30s;
        }
    "#});

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].rule, "scope/access");
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert_eq!(diagnostics[0].token.line, 2);
}

#[test]
fn test_assign_read_only() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            set client.ip = "127.0.0.1";
        }
    "#});

    assert_eq!(rules_of(&diagnostics), vec!["assign/read-only"]);
}

#[test]
fn test_undefined_variable() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            set req.http.X = req.no_such_thing;
        }
    "#});

    assert_eq!(rules_of(&diagnostics), vec!["variable/undefined"]);
}

#[test]
fn test_unset_not_allowed() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            unset req.url;
        }
    "#});

    assert_eq!(rules_of(&diagnostics), vec!["unset/not-allowed"]);
}

#[test]
fn test_declare_rules() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            declare local count INTEGER;
            declare local var.n INTEGER;
            declare local var.n INTEGER;
            set var.n = 1;
        }
    "#});

    assert_eq!(
        rules_of(&diagnostics),
        vec!["declare/var-prefix", "declare/duplicate"]
    );
}

#[test]
fn test_unused_local_is_info() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            declare local var.idle STRING;
        }
    "#});

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].rule, "declaration/unused");
    assert_eq!(diagnostics[0].severity, Severity::Info);
    assert!(diagnostics[0].message.contains("var.idle"));
}

#[test]
fn test_unused_declarations_reported() {
    let diagnostics = lint_source(indoc! {r#"
        acl office {
            "10.0.0.0"/8;
        }

        backend origin {
            .host = "origin.example.com";
        }

        sub vcl_recv {
            set req.backend = origin;
        }
    "#});

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].rule, "declaration/unused");
    assert!(diagnostics[0].message.contains("acl `office`"));
}

#[test]
fn test_duplicate_declaration() {
    let diagnostics = lint_source(indoc! {r#"
        backend origin {
            .host = "a.example.com";
        }

        backend origin {
            .host = "b.example.com";
        }

        sub vcl_recv {
            set req.backend = origin;
        }
    "#});

    assert_eq!(rules_of(&diagnostics), vec!["declaration/duplicate"]);
}

#[test]
fn test_director_references_undeclared_backend() {
    let diagnostics = lint_source(indoc! {r#"
        director pool random {
            { .backend = origin; .weight = 1; }
        }

        sub vcl_recv {
            set req.backend = pool;
        }
    "#});

    assert_eq!(rules_of(&diagnostics), vec!["variable/undefined"]);
    assert!(diagnostics[0].message.contains("pool"));
}

#[test]
fn test_regex_capture_overwrite_warns_once() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            if (req.url ~ "^/a/(.*)") {
                set req.http.X = "a";
            }
            if (req.url ~ "^/b/(.*)") {
                set req.http.X = "b";
            }
            if (req.url ~ "^/c/(.*)") {
                set req.http.X = re.group.1;
            }
        }
    "#});

    let captures: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.rule == "regex/capture-overwritten")
        .collect();
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].severity, Severity::Warning);
}

#[test]
fn test_regex_capture_overwrite_despite_intervening_read() {
    // Reading the groups between two matches does not make the second
    // match safe; the earlier captures are still clobbered.
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            if (req.url ~ "^/(a)/(.*)") {
                set req.http.X = "a";
            }
            set req.http.Y = re.group.1;
            if (req.url ~ "^/b/(.*)") {
                set req.http.X = "b";
            }
        }
    "#});

    let captures: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.rule == "regex/capture-overwritten")
        .collect();
    assert_eq!(captures.len(), 1);
}

#[test]
fn test_branch_local_match_does_not_leak() {
    // The match inside the first arm is restored before the second arm, so
    // no overwrite is flagged.
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            if (req.http.Mode == "a") {
                if (req.url ~ "^/a/(.*)") {
                    set req.http.X = re.group.1;
                }
            } else {
                if (req.url ~ "^/b/(.*)") {
                    set req.http.X = re.group.1;
                }
            }
        }
    "#});

    assert!(diagnostics.is_empty(), "unexpected: {:?}", diagnostics);
}

#[test]
fn test_condition_must_be_bool() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            if (req.http.Host) {
                restart;
            }
        }
    "#});

    assert_eq!(rules_of(&diagnostics), vec!["operator/condition"]);
}

#[test]
fn test_assignment_operator_checked_against_target() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            set req.http.X-Count -= "1";
        }
    "#});

    assert!(rules_of(&diagnostics).contains(&"operator/assignment"));
}

#[test]
fn test_assignment_type_mismatch() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            declare local var.n INTEGER;
            set var.n = "nope";
            set req.http.X = var.n;
        }
    "#});

    assert_eq!(rules_of(&diagnostics), vec!["type/mismatch"]);
}

#[test]
fn test_function_checks() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            set req.http.A = std.tolower(req.http.Host);
            set req.http.B = std.tolower();
            set req.http.C = std.no_such(req.http.Host);
        }
    "#});

    let rules = rules_of(&diagnostics);
    assert!(rules.contains(&"function/arity"));
    assert!(rules.contains(&"function/undefined"));
}

#[test]
fn test_call_of_undeclared_subroutine() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            call missing;
        }
    "#});

    assert_eq!(rules_of(&diagnostics), vec!["call/undefined"]);
}

#[test]
fn test_custom_subroutine_linted_at_call_site() {
    // `helper` runs in recv scope because that is where it is called, so
    // touching beresp there is a scope error.
    let diagnostics = lint_source(indoc! {r#"
        sub helper {
            set beresp.ttl = 30s;
        }

        sub vcl_recv {
            call helper;
        }
    "#});

    assert_eq!(rules_of(&diagnostics), vec!["scope/access"]);
    assert_eq!(diagnostics[0].token.line, 2);
}

#[test]
fn test_uncalled_custom_subroutine_is_unused() {
    let diagnostics = lint_source(indoc! {r#"
        sub helper {
            set beresp.ttl = 30s;
        }

        sub vcl_recv {
            restart;
        }
    "#});

    // Never linted (no call site) and reported unused.
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].rule, "declaration/unused");
    assert!(diagnostics[0].message.contains("helper"));
}

#[test]
fn test_recursive_calls_do_not_loop() {
    let diagnostics = lint_source(indoc! {r#"
        sub ping {
            call pong;
        }

        sub pong {
            call ping;
        }

        sub vcl_recv {
            call ping;
        }
    "#});

    assert!(diagnostics.is_empty(), "unexpected: {:?}", diagnostics);
}

#[test]
fn test_scope_annotation_lints_custom_subroutine() {
    let diagnostics = lint_source(indoc! {r#"
        # @scope: recv
        sub annotated {
            set beresp.ttl = 30s;
        }
    "#});

    assert!(rules_of(&diagnostics).contains(&"scope/access"));
}

#[test]
fn test_functional_subroutine_return_type() {
    let diagnostics = lint_source(indoc! {r#"
        sub pick STRING {
            return 42;
        }

        sub vcl_recv {
            set req.http.X = pick();
        }
    "#});

    assert_eq!(rules_of(&diagnostics), vec!["return/type"]);
}

#[test]
fn test_lifecycle_return_state_checked() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            return("free text");
        }
    "#});

    assert_eq!(rules_of(&diagnostics), vec!["return/type"]);
}

#[test]
fn test_goto_unresolved() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            done:
            goto done;
        }
    "#});

    assert_eq!(rules_of(&diagnostics), vec!["goto/unresolved"]);
}

#[test]
fn test_goto_forward_resolves() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            goto done;
            set req.http.X = "skipped";
            done:
            restart;
        }
    "#});

    assert!(diagnostics.is_empty(), "unexpected: {:?}", diagnostics);
}

#[test]
fn test_unresolved_include_reported() {
    let diagnostics = lint_source(indoc! {r#"
        sub vcl_recv {
            include "never-resolved";
        }
    "#});

    assert_eq!(rules_of(&diagnostics), vec!["include/unresolved"]);
}

#[test]
fn test_severity_override_to_ignore() {
    let mut config = Config::default();
    config
        .rules
        .insert("scope/access".to_string(), Severity::Ignore);

    let diagnostics = lint_with_config(
        indoc! {r#"
            sub vcl_recv {
                set beresp.ttl = 30s;
            }
        "#},
        &config,
    );

    assert!(diagnostics.is_empty(), "unexpected: {:?}", diagnostics);
}

#[test]
fn test_severity_override_downgrade() {
    let mut config = Config::default();
    config
        .rules
        .insert("unset/not-allowed".to_string(), Severity::Warning);

    let diagnostics = lint_with_config(
        indoc! {r#"
            sub vcl_recv {
                unset req.url;
            }
        "#},
        &config,
    );

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
}

#[test]
fn test_diagnostics_deduplicated() {
    // The helper body is walked once per call site; both walks produce the
    // same finding at the same token, which is reported once.
    let diagnostics = lint_source(indoc! {r#"
        sub tweak {
            set bereq.url = "/";
        }

        sub vcl_recv {
            call tweak;
            call tweak;
        }
    "#});

    let scope_findings = diagnostics
        .iter()
        .filter(|d| d.rule == "scope/access")
        .count();
    assert_eq!(scope_findings, 1);
}

#[test]
fn test_annotated_scopes_report_per_scope() {
    // A two-scope annotation lints the body under each phase. The messages
    // name different phases, so both findings survive deduplication.
    let diagnostics = lint_source(indoc! {r#"
        # @scope: deliver,log
        sub annotated {
            set bereq.url = "/";
        }
    "#});

    let scope_findings: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.rule == "scope/access")
        .collect();
    assert_eq!(scope_findings.len(), 2);
    assert_ne!(scope_findings[0].message, scope_findings[1].message);
}
