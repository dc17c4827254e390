//! # Report Templates
//!
//! @title Markdown Report Templates
//! @author Ramprasad
//!
//! Handlebars templates used by the Markdown formatter.

/// Full Markdown report for a scan run.
pub const MARKDOWN_REPORT_TEMPLATE: &str = r#"# Move-Sentinel Security Report

| | |
|---|---|
| Version | {{version}} |
| Scanned | `{{scanned_path}}` |
| Timestamp | {{timestamp}} |
| Files analyzed | {{files_analyzed}} |
| Rules loaded | {{rules_loaded}} |

## Summary

| File | Score | Risk | Critical | High | Medium | Low | Deployment |
|------|-------|------|----------|------|--------|-----|------------|
{{#each files}}
| `{{path}}` | {{score}}/100 | {{risk_level}} | {{critical}} | {{high}} | {{medium}} | {{low}} | {{#if deployment_ready}}ready{{else}}blocked{{/if}} |
{{/each}}
{{#each files}}

## `{{path}}`

{{#if findings}}
{{#each findings}}
### {{index}}. {{rule_id}} ({{function_or_pattern}})

{{badge}}

- **Line:** {{line}}
- **Missing checks:** {{missing}}
{{#if exploit_example}}
- **Known exploit:** {{exploit_example}}
{{/if}}
{{#if cve_reference}}
- **Reference:** {{cve_reference}}
{{/if}}

```move
{{snippet}}
```

**Recommendation:** {{recommendation}}

**Fix:**

```move
{{fix}}
```

{{/each}}
{{else}}
No threats found.
{{/if}}
{{/each}}
"#;
