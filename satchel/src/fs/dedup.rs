use tracing::debug;

use super::entry::{Entry, EntryError};

/// Find a name under the candidate's parent that does not collide with an
/// existing entry. Probes `name`, then `name (1)`, `name (2)`, … until a free
/// slot turns up; files re-attach their extension on every probe. The first
/// probe that does not exist is returned, so a candidate with no collision
/// comes back unchanged. Nothing is created on storage.
pub async fn resolve_unique(candidate: &Entry) -> Result<Entry, EntryError> {
    let base = candidate.name_no_extension();
    let extension = candidate.extension();
    let mut attempt: u32 = 0;
    loop {
        let name = probe_name(&base, extension.as_deref(), candidate.is_directory(), attempt);
        let probe = candidate.sibling(&name)?;
        debug!(path = %probe.location(), "probing for name collision");
        if !probe.exists().await? {
            return Ok(probe);
        }
        attempt += 1;
    }
}

/// Blocking variant of [`resolve_unique`] with identical probing logic, for
/// callers that cannot suspend. Probe errors are raised to the caller.
pub fn resolve_unique_blocking(candidate: &Entry) -> Result<Entry, EntryError> {
    let base = candidate.name_no_extension();
    let extension = candidate.extension();
    let mut attempt: u32 = 0;
    loop {
        let name = probe_name(&base, extension.as_deref(), candidate.is_directory(), attempt);
        let probe = candidate.sibling(&name)?;
        debug!(path = %probe.location(), "probing for name collision");
        if !probe.exists_blocking()? {
            return Ok(probe);
        }
        attempt += 1;
    }
}

fn probe_name(base: &str, extension: Option<&str>, is_dir: bool, attempt: u32) -> String {
    let mut name = if attempt == 0 {
        base.to_string()
    } else {
        format!("{base} ({attempt})")
    };
    if !is_dir && let Some(extension) = extension {
        name.push('.');
        name.push_str(extension);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::entry::{LocalEntry, RemoteEntry};
    use satchel_core::DriveClient;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn found(path: &str, kind: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "path": path,
            "name": path.rsplit('/').next().unwrap(),
            "type": kind,
        }))
    }

    fn not_found() -> ResponseTemplate {
        ResponseTemplate::new(404).set_body_json(json!({ "error": "not_found" }))
    }

    #[test]
    fn probe_name_formats_attempts() {
        assert_eq!(probe_name("notes", None, true, 0), "notes");
        assert_eq!(probe_name("notes", None, true, 2), "notes (2)");
        assert_eq!(probe_name("a", Some("txt"), false, 0), "a.txt");
        assert_eq!(probe_name("a", Some("txt"), false, 3), "a (3).txt");
        assert_eq!(probe_name("README", None, false, 1), "README (1)");
    }

    #[test]
    fn unchanged_when_nothing_collides() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = Entry::Local(LocalEntry::new(dir.path().join("a.txt"), false));

        let resolved = resolve_unique_blocking(&candidate).unwrap();

        assert_eq!(resolved.name(), "a.txt");
    }

    #[test]
    fn files_keep_their_extension_across_probes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("a (1).txt"), b"x").unwrap();
        let candidate = Entry::Local(LocalEntry::new(dir.path().join("a.txt"), false));

        let resolved = resolve_unique_blocking(&candidate).unwrap();

        assert_eq!(resolved.name(), "a (2).txt");
        assert!(!resolved.exists_blocking().unwrap());
    }

    #[test]
    fn directories_never_gain_a_suffix_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("notes")).unwrap();
        std::fs::create_dir(dir.path().join("notes (1)")).unwrap();
        let candidate = Entry::Local(LocalEntry::new(dir.path().join("notes"), true));

        let resolved = resolve_unique_blocking(&candidate).unwrap();

        assert_eq!(resolved.name(), "notes (2)");
    }

    #[tokio::test]
    async fn remote_probing_checks_each_name_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/drive/resources"))
            .and(query_param("path", "/Docs/notes"))
            .respond_with(found("/Docs/notes", "dir"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/drive/resources"))
            .and(query_param("path", "/Docs/notes (1)"))
            .respond_with(found("/Docs/notes (1)", "dir"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/drive/resources"))
            .and(query_param("path", "/Docs/notes (2)"))
            .respond_with(not_found())
            .expect(1)
            .mount(&server)
            .await;

        let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
        let candidate = Entry::Remote(RemoteEntry::new(client, "/Docs/notes", true));

        let resolved = resolve_unique(&candidate).await.unwrap();

        assert_eq!(resolved.location(), "/Docs/notes (2)");
        assert!(resolved.is_remote());
    }

    #[tokio::test]
    async fn remote_file_probe_keeps_extension() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/drive/resources"))
            .and(query_param("path", "/Docs/a.txt"))
            .respond_with(found("/Docs/a.txt", "file"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/drive/resources"))
            .and(query_param("path", "/Docs/a (1).txt"))
            .respond_with(not_found())
            .expect(1)
            .mount(&server)
            .await;

        let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
        let candidate = Entry::Remote(RemoteEntry::new(client, "/Docs/a.txt", false));

        let resolved = resolve_unique(&candidate).await.unwrap();

        assert_eq!(resolved.location(), "/Docs/a (1).txt");
    }

    #[tokio::test]
    async fn probe_errors_surface_to_the_caller() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/drive/resources"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
        let candidate = Entry::Remote(RemoteEntry::new(client, "/Docs/a.txt", false));

        let err = resolve_unique(&candidate).await.expect_err("expected 503");
        assert!(matches!(err, EntryError::Drive(_)));
    }
}
