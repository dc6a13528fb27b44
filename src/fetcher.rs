use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use std::time::Duration;
use log::debug;
use url::Url;

use crate::error::FetchError;
use crate::record::JobId;

/// Source of job detail pages.
pub trait Fetcher: Send + Sync {
    /// Returns the page text for `jobid`. Error pages are returned as pages; only a
    /// failure to talk to the source is an error.
    fn fetch(&self, jobid: &JobId) -> Result<String, FetchError>;
}

/// Fetches `{base_url}/detail/{jobid}/` over HTTP(S).
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let trimmed = base_url.trim_end_matches('/');
        Url::parse(trimmed).map_err(|source| FetchError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("de-CH,de;q=0.9,en;q=0.8"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("jobinfo_collector/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(FetchError::Client)?;

        Ok(HttpFetcher {
            client,
            base_url: trimmed.to_string(),
        })
    }

    pub fn detail_url(&self, jobid: &JobId) -> String {
        format!("{}/detail/{}/", self.base_url, jobid)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, jobid: &JobId) -> Result<String, FetchError> {
        let url = self.detail_url(jobid);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            debug!("Got {} for job {}, keeping error page", status, jobid);
        }

        // Decodes using the charset in Content-Type, UTF-8 otherwise.
        resp.text().map_err(|source| FetchError::Body { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves one canned response and hands back the request line it saw.
    fn serve_once(response: Vec<u8>) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            stream.write_all(&response).unwrap();
            stream.flush().unwrap();
            request.lines().next().unwrap_or_default().to_string()
        });
        (format!("http://{}/de/stellenangebote/", addr), handle)
    }

    #[test]
    fn detail_url_uses_template() {
        let fetcher =
            HttpFetcher::new("https://www.jobs.ch/de/stellenangebote/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            fetcher.detail_url(&JobId::from("1234")),
            "https://www.jobs.ch/de/stellenangebote/detail/1234/"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = HttpFetcher::new("not a url", Duration::from_secs(5)).err().unwrap();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn error_status_still_returns_body() {
        let body = "<html><head><title>Not found</title></head></html>";
        let response = format!(
            "HTTP/1.1 404 Not Found\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let (base, server) = serve_once(response.into_bytes());

        let fetcher = HttpFetcher::new(&base, Duration::from_secs(5)).unwrap();
        let text = fetcher.fetch(&JobId::from("9999")).unwrap();

        assert_eq!(text, body);
        assert_eq!(
            server.join().unwrap(),
            "GET /de/stellenangebote/detail/9999/ HTTP/1.1"
        );
    }

    fn response_with(content_type: &str, body: &[u8]) -> Vec<u8> {
        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            content_type,
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }

    #[test]
    fn body_is_decoded_with_declared_charset() {
        // "Zürich" in Latin-1
        let body = b"<p>Z\xfcrich</p>";
        let (base, server) = serve_once(response_with("text/html; charset=iso-8859-1", body));

        let fetcher = HttpFetcher::new(&base, Duration::from_secs(5)).unwrap();
        let text = fetcher.fetch(&JobId::from("42")).unwrap();
        server.join().unwrap();

        assert_eq!(text, "<p>Zürich</p>");
    }

    #[test]
    fn body_without_charset_is_utf8() {
        let (base, server) = serve_once(response_with("text/html", "<p>Zürich</p>".as_bytes()));

        let fetcher = HttpFetcher::new(&base, Duration::from_secs(5)).unwrap();
        let text = fetcher.fetch(&JobId::from("42")).unwrap();
        server.join().unwrap();

        assert_eq!(text, "<p>Zürich</p>");
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let fetcher =
            HttpFetcher::new(&format!("http://127.0.0.1:{}", port), Duration::from_secs(2)).unwrap();
        let err = fetcher.fetch(&JobId::from("1")).unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
