//! Integration tests for rendering the embedded install templates

use fluxinstall_core::{AssetEntry, AssetSource, CoreError, MemoryAssets, TemplateParameters};
use fluxinstall_engine::{render_all, render_all_from, Engine, RenderError, RenderedManifests};
use serde::Deserialize as _;

const CONFIG_CONTENT: &str = "config1: configuration1
config2: configuration2
config3: configuration3";

/// Structural problems of one rendered file, one string per problem
///
/// Every YAML document must be a mapping with string `apiVersion`, `kind`
/// and `metadata.name`. Empty documents are allowed.
fn validate(contents: &[u8]) -> Vec<String> {
    let text = match std::str::from_utf8(contents) {
        Ok(text) => text,
        Err(e) => return vec![format!("not UTF-8: {e}")],
    };

    let mut problems = Vec::new();
    for (i, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = match serde_yaml::Value::deserialize(document) {
            Ok(value) => value,
            Err(e) => {
                problems.push(format!("document {i}: invalid YAML: {e}"));
                continue;
            }
        };
        if value.is_null() {
            continue;
        }

        for key in ["apiVersion", "kind"] {
            if !value.get(key).is_some_and(|v| v.is_string()) {
                problems.push(format!("document {i}: missing string `{key}`"));
            }
        }
        let name = value.get("metadata").and_then(|m| m.get("name"));
        if !name.is_some_and(|v| v.is_string()) {
            problems.push(format!("document {i}: missing string `metadata.name`"));
        }
    }
    problems
}

fn render_checked(expected_count: usize, params: &TemplateParameters) -> RenderedManifests {
    let manifests = render_all(params).unwrap_or_else(|e| panic!("render failed: {e}"));
    assert_eq!(manifests.len(), expected_count, "got {:?}", manifests.keys());

    for (name, contents) in &manifests {
        let problems = validate(contents);
        assert!(
            problems.is_empty(),
            "found problems with manifest {}:\ncontent:\n{}\nerrors: {:?}",
            name,
            String::from_utf8_lossy(contents),
            problems
        );
    }
    manifests
}

fn text<'a>(manifests: &'a RenderedManifests, name: &str) -> &'a str {
    std::str::from_utf8(&manifests[name]).unwrap()
}

fn all_parameters() -> TemplateParameters {
    TemplateParameters::builder()
        .git_url("git@github.com:fluxcd/flux-get-started")
        .git_branch("branch")
        .git_paths(["dir1", "dir2"])
        .git_label("label")
        .git_user("User")
        .git_email("this.is@anemail.com")
        .namespace("flux")
        .manifest_generation(true)
        .additional_flux_args(["arg1=foo", "arg2=bar"])
        .registry_scanning(true)
        .build()
}

fn minimal(registry_scanning: bool) -> TemplateParameters {
    TemplateParameters::builder()
        .git_url("git@github.com:fluxcd/flux-get-started")
        .git_branch("branch")
        .git_label("label")
        .registry_scanning(registry_scanning)
        .build()
}

#[test]
fn test_all_parameters() {
    let manifests = render_checked(6, &all_parameters());

    let deployment = text(&manifests, "flux-deployment.yaml");
    assert!(deployment.contains("- --git-path=dir1,dir2"));
    assert!(deployment.contains("- --git-user=User"));
    assert!(deployment.contains("- --manifest-generation=true"));
    assert!(deployment.contains("- --memcached-hostname=memcached.flux.svc.cluster.local"));
    assert!(deployment.contains("- --arg1=foo\n        - --arg2=bar\n"));
    assert!(!deployment.contains("--registry-disable-scanning"));
    assert!(manifests.contains_key("memcache-dep.yaml"));
    assert!(manifests.contains_key("memcache-svc.yaml"));
}

#[test]
fn test_missing_values() {
    let manifests = render_checked(6, &minimal(true));

    let deployment = text(&manifests, "flux-deployment.yaml");
    assert!(!deployment.contains("--git-path"));
    assert!(!deployment.contains("--git-user"));
    assert!(!deployment.contains("namespace:"));
}

#[test]
fn test_zero_value_parameters() {
    render_checked(4, &TemplateParameters::default());
}

#[test]
fn test_no_memcached_without_scanning() {
    let manifests = render_checked(4, &minimal(false));
    assert!(!manifests.keys().any(|k| k.contains("memcache")));
    assert!(text(&manifests, "flux-deployment.yaml").contains("- --registry-disable-scanning"));
}

#[test]
fn test_no_memcached_in_read_only_mode() {
    let mut params = all_parameters();
    params.git_read_only = true;

    let manifests = render_checked(4, &params);
    let deployment = text(&manifests, "flux-deployment.yaml");
    assert!(deployment.contains("- --git-readonly"));
    assert!(!deployment.contains("--memcached-service"));
}

#[test]
fn test_output_names() {
    let manifests = render_checked(6, &all_parameters());
    let names: Vec<&str> = manifests.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec![
            "flux-account.yaml",
            "flux-config.yaml",
            "flux-deployment.yaml",
            "flux-secret.yaml",
            "memcache-dep.yaml",
            "memcache-svc.yaml",
        ]
    );
}

#[test]
fn test_deterministic() {
    let params = all_parameters();
    assert_eq!(render_all(&params).unwrap(), render_all(&params).unwrap());
}

#[test]
fn test_config_file_as_config_map() {
    let mut params = all_parameters();
    params.registry_scanning = false;
    params.config_file_content = CONFIG_CONTENT.to_string();
    params.config_as_config_map = true;

    let manifests = render_checked(4, &params);
    let config = text(&manifests, "flux-config.yaml");
    assert!(config.contains("kind: ConfigMap"));
    assert!(config.contains("\n    config2: configuration2\n"));

    let deployment = text(&manifests, "flux-deployment.yaml");
    assert!(deployment.contains("configMap:\n          name: flux-config"));
    assert!(deployment.contains("- --config-file=/etc/fluxd/conf/flux-config.yaml"));
}

#[test]
fn test_config_file_as_secret() {
    let mut params = all_parameters();
    params.registry_scanning = false;
    params.config_file_content = CONFIG_CONTENT.to_string();
    params.config_as_config_map = false;

    let manifests = render_checked(4, &params);
    let config = text(&manifests, "flux-config.yaml");
    assert!(config.contains("kind: Secret"));
    assert!(config.contains(
        "  flux-config.yaml: \"Y29uZmlnMTogY29uZmlndXJhdGlvbjEKY29uZmlnMjogY29uZmlndXJhdGlvbjIKY29uZmlnMzogY29uZmlndXJhdGlvbjM=\""
    ));

    let deployment = text(&manifests, "flux-deployment.yaml");
    assert!(deployment.contains("secretName: flux-config"));
}

#[test]
fn test_config_map_payload_round_trips() {
    let mut params = minimal(false);
    params.config_file_content = CONFIG_CONTENT.to_string();
    params.config_as_config_map = true;

    let manifests = render_all(&params).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_slice(&manifests["flux-config.yaml"]).unwrap();
    let payload = doc["data"]["flux-config.yaml"].as_str().unwrap();
    assert_eq!(payload.trim_end(), CONFIG_CONTENT);
}

#[test]
fn test_no_config_file() {
    let manifests = render_checked(4, &minimal(false));
    assert!(manifests["flux-config.yaml"].is_empty());
    assert!(!text(&manifests, "flux-deployment.yaml").contains("flux-config"));
}

#[test]
fn test_broken_template_returns_no_manifests() {
    let assets = MemoryAssets::new()
        .with_text_file("a-good.yaml.tmpl", "kind: {{ git_label }}\n")
        .with_text_file("b-bad.yaml.tmpl", "{% if git_url %}unterminated\n")
        .with_text_file("c-good.yaml.tmpl", "kind: {{ git_label }}\n");

    let err = render_all_from(&assets, &Engine::default(), &minimal(true)).unwrap_err();
    match err {
        RenderError::Parse { template, .. } => assert_eq!(template, "b-bad.yaml.tmpl"),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_failing_execution_is_reported() {
    let assets = MemoryAssets::new().with_text_file("x.yaml.tmpl", "{{ indent(git_url, git_url) }}");

    let err = render_all_from(&assets, &Engine::default(), &minimal(true)).unwrap_err();
    assert!(matches!(err, RenderError::Execution { .. }));
    assert!(err.to_string().contains("cannot execute template for embedded file \"x.yaml.tmpl\""));
}

#[test]
fn test_excluded_template_is_never_compiled() {
    let assets = MemoryAssets::new()
        .with_text_file("memcache-broken.yaml.tmpl", "{% if %}")
        .with_text_file("ok.yaml.tmpl", "ok\n");

    let manifests = render_all_from(&assets, &Engine::default(), &minimal(false)).unwrap();
    assert_eq!(manifests.len(), 1);
}

#[test]
fn test_unreadable_template() {
    let assets = MemoryAssets::new().with_file("bad.yaml.tmpl", vec![0xc3, 0x28]);

    let err = render_all_from(&assets, &Engine::default(), &minimal(true)).unwrap_err();
    assert!(matches!(err, RenderError::Read { ref template, .. } if template == "bad.yaml.tmpl"));
}

struct UnwalkableAssets;

impl AssetSource for UnwalkableAssets {
    fn walk(&self, root: &str) -> fluxinstall_core::Result<Vec<AssetEntry<'_>>> {
        Err(CoreError::AssetWalk {
            root: root.to_string(),
            message: "corpus unavailable".to_string(),
        })
    }
}

#[test]
fn test_enumeration_failure() {
    let err = render_all_from(&UnwalkableAssets, &Engine::default(), &minimal(true)).unwrap_err();
    assert!(matches!(err, RenderError::Enumeration(_)));
    assert!(err.to_string().starts_with("cannot walk embedded files"));
}

#[test]
fn test_parallel_renders() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let params = minimal(i % 2 == 0);
                render_all(&params).unwrap().len()
            })
        })
        .collect();

    let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, vec![6, 4, 6, 4]);
}
