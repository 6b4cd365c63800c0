use crate::error::{self, Result};
use crate::test_settings::TestSettings;
use futures::future::try_join_all;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Client, ResourceExt};
use log::{debug, info, trace};
use serde::Deserialize;
use snafu::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CRD_KIND: &str = "CustomResourceDefinition";
const MANIFEST_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];
const ESTABLISHED_POLL: Duration = Duration::from_millis(250);

/// Returns the path to the bundled `fake_crds` directory.
pub fn fake_crds_path(settings: &TestSettings) -> PathBuf {
    settings.manifest_root()
}

/// Returns the immediate subdirectories of the bundled `fake_crds` directory, sorted by name.
/// Manifest discovery does not recurse, so every subdirectory must be listed individually.
pub fn fake_crd_sub_dirs(settings: &TestSettings) -> Result<Vec<PathBuf>> {
    let base = fake_crds_path(settings);
    let entries = fs::read_dir(&base).context(error::ManifestDirSnafu { path: &base })?;
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.context(error::ManifestDirSnafu { path: &base })?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Reads every CRD from the manifest files found directly inside `dir`. Subdirectories are
/// ignored, as are documents of any other kind.
pub fn read_crd_dir(dir: &Path) -> Result<Vec<CustomResourceDefinition>> {
    let entries = fs::read_dir(dir).context(error::ManifestDirSnafu { path: dir })?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.context(error::ManifestDirSnafu { path: dir })?.path();
        if path.is_file() && has_manifest_extension(&path) {
            files.push(path);
        }
    }
    files.sort();

    let mut crds = Vec::new();
    for path in files {
        let manifest =
            fs::read_to_string(&path).context(error::ManifestReadSnafu { path: &path })?;
        crds.extend(parse_crds(&manifest, &path)?);
    }
    Ok(crds)
}

fn has_manifest_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MANIFEST_EXTENSIONS.contains(&ext))
        .unwrap_or_default()
}

/// Splits a (possibly multi-document) YAML manifest and deserializes the CRDs in it.
fn parse_crds(manifest: &str, path: &Path) -> Result<Vec<CustomResourceDefinition>> {
    let mut crds = Vec::new();
    for doc in serde_yaml::Deserializer::from_str(manifest) {
        let value =
            serde_yaml::Value::deserialize(doc).context(error::ManifestParseSnafu { path })?;
        if value.is_null() {
            continue;
        }
        let kind = value.get("kind").and_then(|kind| kind.as_str());
        if kind != Some(CRD_KIND) {
            debug!(
                "skipping document of kind {:?} in '{}'",
                kind,
                path.display()
            );
            continue;
        }
        let crd: CustomResourceDefinition =
            serde_yaml::from_value(value).context(error::ManifestParseSnafu { path })?;
        crds.push(crd);
    }
    Ok(crds)
}

/// Installs the CRDs into the cluster and waits until the API server reports each of them as
/// established.
pub async fn install_crds(
    client: &Client,
    crds: &[CustomResourceDefinition],
    timeout: Duration,
) -> Result<()> {
    let api: Api<CustomResourceDefinition> = Api::all(client.clone());
    for crd in crds {
        create_or_update(&api, crd).await?;
    }
    try_join_all(
        crds.iter()
            .map(|crd| wait_for_established(&api, crd.name_any(), timeout)),
    )
    .await?;
    info!("installed {} CRDs", crds.len());
    Ok(())
}

async fn create_or_update(
    api: &Api<CustomResourceDefinition>,
    crd: &CustomResourceDefinition,
) -> Result<()> {
    let name = crd.name_any();
    // If the CRD already exists, update it with the new one using a `Patch`. If not create a
    // new one.
    let existing = api.get_opt(&name).await.context(error::InstallCrdSnafu {
        action: "get",
        name: &name,
    })?;
    match existing {
        Some(_) => {
            trace!("patching existing CRD '{}'", name);
            api.patch(&name, &PatchParams::default(), &Patch::Merge(crd))
                .await
                .context(error::InstallCrdSnafu {
                    action: "patch",
                    name: &name,
                })?;
        }
        None => {
            trace!("creating CRD '{}'", name);
            api.create(&PostParams::default(), crd)
                .await
                .context(error::InstallCrdSnafu {
                    action: "create",
                    name: &name,
                })?;
        }
    }
    Ok(())
}

/// Waits until the CRD has an `Established` condition with status `True`. A request that is still
/// pending when the timeout passes counts as not established.
async fn wait_for_established(
    api: &Api<CustomResourceDefinition>,
    name: String,
    timeout: Duration,
) -> Result<()> {
    match tokio::time::timeout(timeout, poll_established(api, &name)).await {
        Ok(result) => result,
        Err(_) => error::CrdNotEstablishedSnafu {
            name: &name,
            timeout,
        }
        .fail(),
    }
}

async fn poll_established(api: &Api<CustomResourceDefinition>, name: &str) -> Result<()> {
    loop {
        let crd = api.get(name).await.context(error::InstallCrdSnafu {
            action: "get",
            name,
        })?;
        if is_established(&crd) {
            return Ok(());
        }
        trace!("waiting for CRD '{}' to be established", name);
        tokio::time::sleep(ESTABLISHED_POLL).await;
    }
}

pub(crate) fn is_established(crd: &CustomResourceDefinition) -> bool {
    crd.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Established" && c.status == "True")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::{mock_client, status_failure};
    use hyper::Method;
    use std::collections::BTreeSet;
    use tokio::time::timeout;

    const WIDGET_CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: widgets.example.com
spec:
  group: example.com
  names:
    kind: Widget
    listKind: WidgetList
    plural: widgets
    singular: widget
  scope: Namespaced
  versions:
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
          x-kubernetes-preserve-unknown-fields: true
"#;

    fn settings_for(root: &Path) -> TestSettings {
        TestSettings {
            manifest_root: Some(root.to_path_buf()),
            ..TestSettings::default()
        }
    }

    #[test]
    fn bundled_fake_crds_path_exists() {
        let path = fake_crds_path(&TestSettings::default());
        assert!(path.is_dir(), "'{}' is not a directory", path.display());
    }

    #[test]
    fn bundled_sub_dirs_exist_and_hold_crds() {
        let dirs = fake_crd_sub_dirs(&TestSettings::default()).unwrap();
        assert!(!dirs.is_empty());
        for dir in dirs {
            assert!(dir.is_dir());
            let crds = read_crd_dir(&dir).unwrap();
            assert!(!crds.is_empty(), "no CRDs in '{}'", dir.display());
            for crd in crds {
                assert!(
                    crd.spec.versions.iter().all(|v| v
                        .subresources
                        .as_ref()
                        .and_then(|s| s.status.as_ref())
                        .is_some()),
                    "'{}' does not enable the status subresource",
                    crd.name_any()
                );
            }
        }
    }

    #[test]
    fn bundled_kinds_cover_simulated_operators() {
        let kinds: BTreeSet<String> = fake_crd_sub_dirs(&TestSettings::default())
            .unwrap()
            .iter()
            .flat_map(|dir| read_crd_dir(dir).unwrap())
            .map(|crd| crd.spec.names.kind)
            .collect();
        for kind in [
            "Certificate",
            "ExternalSecret",
            "MariaDB",
            "Memcached",
            "RabbitmqCluster",
        ] {
            assert!(kinds.contains(kind), "missing {}", kind);
        }
    }

    #[test]
    fn sub_dirs_are_sorted_and_skip_files() {
        let root = tempfile::TempDir::new().unwrap();
        fs::create_dir(root.path().join("b")).unwrap();
        fs::create_dir(root.path().join("a")).unwrap();
        fs::write(root.path().join("README.md"), "not a dir").unwrap();
        let dirs = fake_crd_sub_dirs(&settings_for(root.path())).unwrap();
        assert_eq!(dirs, vec![root.path().join("a"), root.path().join("b")]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = tempfile::TempDir::new().unwrap();
        let missing = root.path().join("nope");
        let err = fake_crd_sub_dirs(&settings_for(&missing)).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn read_crd_dir_is_not_recursive() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("widget.yaml"), WIDGET_CRD).unwrap();
        fs::write(dir.path().join("notes.txt"), WIDGET_CRD).unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("widget.yaml"), WIDGET_CRD).unwrap();

        let crds = read_crd_dir(dir.path()).unwrap();
        assert_eq!(crds.len(), 1);
        assert_eq!(crds[0].name_any(), "widgets.example.com");
    }

    #[test]
    fn multi_document_manifests_skip_other_kinds() {
        let manifest = format!(
            "---\napiVersion: v1\nkind: Namespace\nmetadata:\n  name: ignored\n---\n{}\n---\n",
            WIDGET_CRD
        );
        let crds = parse_crds(&manifest, Path::new("inline.yaml")).unwrap();
        assert_eq!(crds.len(), 1);
        assert_eq!(crds[0].spec.group, "example.com");
    }

    #[test]
    fn malformed_manifest_names_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(
            dir.path().join("broken.yaml"),
            "kind: CustomResourceDefinition\nspec: [",
        )
        .unwrap();
        let err = read_crd_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }

    fn widget(established: bool) -> serde_json::Value {
        let mut crd: serde_json::Value = serde_yaml::from_str(WIDGET_CRD).unwrap();
        crd["status"] = serde_json::json!({
            "acceptedNames": {"kind": "Widget", "plural": "widgets"},
            "storedVersions": ["v1"],
            "conditions": [
                {"type": "Established", "status": if established { "True" } else { "False" }}
            ]
        });
        crd
    }

    #[tokio::test]
    async fn missing_crd_is_created() {
        let (client, mut server) = mock_client();
        let handle = tokio::spawn(async move {
            let (method, uri) = server
                .respond(404, &status_failure(404, "NotFound"))
                .await
                .unwrap();
            assert_eq!(method, Method::GET);
            assert!(uri.contains("/customresourcedefinitions/widgets.example.com"));
            let (method, _) = server.respond(201, &widget(false)).await.unwrap();
            assert_eq!(method, Method::POST);
            let (method, _) = server.respond(200, &widget(true)).await.unwrap();
            assert_eq!(method, Method::GET);
        });
        let crds = parse_crds(WIDGET_CRD, Path::new("widget.yaml")).unwrap();
        install_crds(&client, &crds, Duration::from_secs(5))
            .await
            .unwrap();
        drop(client);
        timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn existing_crd_is_merge_patched() {
        let (client, mut server) = mock_client();
        let handle = tokio::spawn(async move {
            let (method, _) = server.respond(200, &widget(true)).await.unwrap();
            assert_eq!(method, Method::GET);
            let (method, uri) = server.respond(200, &widget(true)).await.unwrap();
            assert_eq!(method, Method::PATCH);
            assert!(uri.contains("/customresourcedefinitions/widgets.example.com"));
            let (method, _) = server.respond(200, &widget(true)).await.unwrap();
            assert_eq!(method, Method::GET);
        });
        let crds = parse_crds(WIDGET_CRD, Path::new("widget.yaml")).unwrap();
        install_crds(&client, &crds, Duration::from_secs(5))
            .await
            .unwrap();
        drop(client);
        timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn crd_that_never_establishes_times_out() {
        let (client, mut server) = mock_client();
        let handle = tokio::spawn(async move {
            server.respond(404, &status_failure(404, "NotFound")).await;
            server.respond(201, &widget(false)).await;
            while server.respond(200, &widget(false)).await.is_some() {}
        });
        let crds = parse_crds(WIDGET_CRD, Path::new("widget.yaml")).unwrap();
        let err = install_crds(&client, &crds, Duration::from_millis(300))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, error::Error::CrdNotEstablished { name, .. } if name == "widgets.example.com"),
            "{}",
            err
        );
        drop(client);
        timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn established_condition_detection() {
        let mut crd: CustomResourceDefinition = serde_yaml::from_str(WIDGET_CRD).unwrap();
        assert!(!is_established(&crd));
        crd.status = Some(
            serde_json::from_value(serde_json::json!({
                "acceptedNames": {"kind": "Widget", "plural": "widgets"},
                "storedVersions": ["v1"],
                "conditions": [
                    {"type": "NamesAccepted", "status": "True"},
                    {"type": "Established", "status": "True"}
                ]
            }))
            .unwrap(),
        );
        assert!(is_established(&crd));
    }
}
