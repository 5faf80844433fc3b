use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gprofiler::GProfilerClient;
use crate::mapping::{IdNamespace, IdentifierMapper, IdentifierMapping};
use crate::{GoError, GoResult};

const CONVERT_PATH: &str = "api/convert/convert/";

#[derive(Serialize)]
struct ConvertRequest<'a> {
    organism: &'a str,
    target: &'a str,
    query: &'a [String],
}

#[derive(Deserialize)]
struct ConvertResponse {
    result: Vec<ConvertEntry>,
}

#[derive(Deserialize)]
struct ConvertEntry {
    incoming: String,
    converted: String,
}

/// Maps identifiers with the g:Convert web service of g:Profiler
#[derive(Debug, Clone)]
pub struct GConvertMapper {
    client: GProfilerClient,
    organism: String,
}

impl GConvertMapper {
    /// Creates a new mapper for `organism` (g:Profiler code, e.g. `hsapiens`)
    ///
    /// Requests g:Convert rejects, e.g. for an unknown organism, fail with
    /// [`GoError::InvalidInput`]. Only connection problems and server errors
    /// are [`GoError::ServiceUnavailable`].
    ///
    /// # Errors
    ///
    /// [`GoError::Config`] if the HTTP client cannot be built
    pub fn new(base_url: &str, organism: &str, timeout: Duration) -> GoResult<Self> {
        Ok(Self {
            client: GProfilerClient::new(base_url, timeout)?,
            organism: organism.to_string(),
        })
    }
}

impl IdentifierMapper for GConvertMapper {
    fn translate(&self, ids: &[String], target: IdNamespace) -> GoResult<IdentifierMapping> {
        let request = ConvertRequest {
            organism: &self.organism,
            target: target.gconvert_target(),
            query: ids,
        };
        let response: ConvertResponse = self
            .client
            .post_json(CONVERT_PATH, &request)
            .map_err(|failure| failure.into_error(GoError::InvalidInput))?;
        let lookup = first_conversions(response.result);
        Ok(IdentifierMapping::from_lookup(ids, |id| lookup.get(id).cloned()))
    }
}

/// Keeps the first converted value of every incoming identifier
///
/// g:Convert reports unknown identifiers with `None` or `N/A`.
fn first_conversions(entries: Vec<ConvertEntry>) -> HashMap<String, String> {
    let mut lookup = HashMap::new();
    for entry in entries {
        if entry.converted == "None" || entry.converted == "N/A" || entry.converted.is_empty() {
            continue;
        }
        lookup.entry(entry.incoming).or_insert(entry.converted);
    }
    lookup
}

#[cfg(test)]
mod test {
    use super::*;

    const RESPONSE: &str = r#"{
        "result": [
            {"incoming": "ENSG3", "converted": "300", "n_incoming": "3", "name": "C"},
            {"incoming": "ENSG1", "converted": "100", "n_incoming": "1", "name": "A"},
            {"incoming": "ENSG1", "converted": "101", "n_incoming": "1", "name": "A"},
            {"incoming": "ENSG2", "converted": "None", "n_incoming": "2", "name": "None"}
        ],
        "meta": {"genes_metadata": {}}
    }"#;

    #[test]
    fn parse_response() {
        let response: ConvertResponse = serde_json::from_str(RESPONSE).unwrap();
        let lookup = first_conversions(response.result);
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup["ENSG1"], "100");
        assert!(!lookup.contains_key("ENSG2"));

        let ids = ["ENSG1", "ENSG2", "ENSG3"].map(String::from);
        let mapping = IdentifierMapping::from_lookup(&ids, |id| lookup.get(id).cloned());
        assert_eq!(mapping.mapped_targets(), ["100", "300"]);
    }

    /// Serves a single HTTP response on a random local port
    fn serve_once(status: &str, body: &'static str) -> String {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn rejected_request_is_invalid_input() {
        let url = serve_once("400 Bad Request", r#"{"message": "unknown organism"}"#);
        let mapper = GConvertMapper::new(&url, "nosuchorg", Duration::from_secs(5)).unwrap();
        let ids = ["ENSG1".to_string()];
        assert!(matches!(
            mapper.map_identifiers(&ids, IdNamespace::Entrez),
            Err(GoError::InvalidInput(msg)) if msg.contains("unknown organism")
        ));
    }

    #[test]
    fn malformed_response_is_invalid_input() {
        let url = serve_once("200 OK", r#"{"unexpected": true}"#);
        let mapper = GConvertMapper::new(&url, "hsapiens", Duration::from_secs(5)).unwrap();
        let ids = ["ENSG1".to_string()];
        assert!(matches!(
            mapper.map_identifiers(&ids, IdNamespace::Entrez),
            Err(GoError::InvalidInput(_))
        ));
    }

    #[test]
    fn unreachable_service() {
        let mapper =
            GConvertMapper::new("http://127.0.0.1:9", "hsapiens", Duration::from_secs(2)).unwrap();
        let ids = ["ENSG1".to_string()];
        assert!(matches!(
            mapper.map_identifiers(&ids, IdNamespace::Entrez),
            Err(GoError::ServiceUnavailable(_))
        ));
    }
}
