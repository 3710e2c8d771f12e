use crate::prelude::*;

pub type ResponseFuture =
    Box<dyn futures::Future<Item = String, Error = Error> + Send>;

/// Request/response exchanges with the voting server.
///
/// Every exchange yields the raw response body; decoding is left to the
/// session so that a malformed body can be treated as a skipped tick
/// rather than a failed request.
pub trait Transport {
    fn send(&self, request: &crate::session::Request) -> ResponseFuture;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoints {
    connect: url::Url,
    status: url::Url,
    vote: url::Url,
    results: url::Url,
    stats: url::Url,
}

impl Endpoints {
    fn new(base: &url::Url) -> Result<Self> {
        let join = |endpoint: &str| {
            base.join(endpoint.trim_start_matches('/')).context(
                crate::error::ParseServerAddress {
                    input: base.as_str(),
                },
            )
        };
        Ok(Self {
            connect: join("/connect")?,
            status: join("/status")?,
            vote: join("/vote")?,
            results: join("/results")?,
            stats: join("/stats")?,
        })
    }

    fn url(&self, request: &crate::session::Request) -> &url::Url {
        match request {
            crate::session::Request::Connect => &self.connect,
            crate::session::Request::PhaseStatus
            | crate::session::Request::CountdownStatus => &self.status,
            crate::session::Request::Stats => &self.stats,
            crate::session::Request::Vote(..) => &self.vote,
            crate::session::Request::Results => &self.results,
        }
    }
}

pub struct Http {
    client: reqwest::r#async::Client,
    endpoints: Endpoints,
}

impl Http {
    pub fn new(base: &url::Url) -> Result<Self> {
        let client = reqwest::r#async::Client::builder()
            .build()
            .context(crate::error::CreateHttpClient)?;
        Ok(Self {
            client,
            endpoints: Endpoints::new(base)?,
        })
    }
}

impl Transport for Http {
    fn send(&self, request: &crate::session::Request) -> ResponseFuture {
        let endpoint = request.endpoint();
        let url = self.endpoints.url(request).clone();
        log::debug!("sending request to {}", url);

        let req = match request {
            crate::session::Request::Vote(ballot) => self
                .client
                .post(url.as_str())
                .header(
                    reqwest::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(ballot.body()),
            _ => self.client.get(url.as_str()),
        };

        let fut = req
            .send()
            .context(crate::error::Request { endpoint })
            .and_then(move |res| {
                res.error_for_status()
                    .context(crate::error::Request { endpoint })
            })
            .and_then(move |mut res| {
                res.text().context(crate::error::ReadResponse { endpoint })
            });
        Box::new(fut)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_endpoints() {
        let base = url::Url::parse("http://127.0.0.1:8080/").unwrap();
        let endpoints = Endpoints::new(&base).unwrap();
        assert_eq!(endpoints.connect.as_str(), "http://127.0.0.1:8080/connect");
        assert_eq!(
            endpoints.url(&crate::session::Request::CountdownStatus).as_str(),
            "http://127.0.0.1:8080/status"
        );
        assert_eq!(
            endpoints.url(&crate::session::Request::PhaseStatus),
            endpoints.url(&crate::session::Request::CountdownStatus)
        );
        assert_eq!(
            endpoints
                .url(&crate::session::Request::Vote(
                    crate::protocol::Ballot::new("c1", "Bob")
                ))
                .as_str(),
            "http://127.0.0.1:8080/vote"
        );
    }

    #[test]
    fn test_endpoints_under_a_path() {
        let base = url::Url::parse("https://example.com/events/42/").unwrap();
        let endpoints = Endpoints::new(&base).unwrap();
        assert_eq!(
            endpoints.results.as_str(),
            "https://example.com/events/42/results"
        );
        assert_eq!(
            endpoints.stats.as_str(),
            "https://example.com/events/42/stats"
        );
    }

    #[test]
    fn test_send_builds_every_request() {
        let base = url::Url::parse("http://127.0.0.1:8080/").unwrap();
        let http = Http::new(&base).unwrap();
        // nothing is polled, so nothing goes out over the network
        for request in &[
            crate::session::Request::Connect,
            crate::session::Request::PhaseStatus,
            crate::session::Request::Stats,
            crate::session::Request::Vote(crate::protocol::Ballot::new(
                "c1", "A B",
            )),
            crate::session::Request::Results,
        ] {
            let _ = http.send(request);
        }
    }
}
