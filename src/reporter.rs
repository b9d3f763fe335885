//! Submission of finished games to the remote scoring service.
//!
//! The game calls [`ResultReporter::submit`] once per terminal transition and
//! never waits for it. Delivery failures are logged and otherwise swallowed:
//! the end-of-game modal is shown whether or not the service was reachable.

use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

const SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// The payload recorded by the scoring service for one finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub score: u32,
    /// Opaque player identifier; `None` when the player is unknown.
    pub user_id: Option<String>,
    pub game_id: u32,
    /// Elapsed seconds at the moment the game ended.
    pub time: u64,
}

/// Receives final results. Implementations must not block the caller.
pub trait ResultReporter: Send + Sync {
    fn submit(&self, result: GameResult);

    /// Wait for any submissions still in flight.
    fn flush(&self) {}
}

/// Posts results as JSON to an HTTP endpoint on a background thread.
#[derive(Debug)]
pub struct HttpReporter {
    client: reqwest::blocking::Client,
    endpoint: String,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl HttpReporter {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(SUBMIT_TIMEOUT)
            .user_agent(concat!("physman/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            pending: Mutex::new(Vec::new()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit synchronously, returning the delivery outcome.
    pub fn post(&self, result: &GameResult) -> Result<()> {
        post_result(&self.client, &self.endpoint, result)
    }
}

fn post_result(
    client: &reqwest::blocking::Client,
    endpoint: &str,
    result: &GameResult,
) -> Result<()> {
    let response = client.post(endpoint).json(result).send()?;
    let status = response.status();

    if !status.is_success() {
        return Err(Error::Rejected(status.as_u16()));
    }

    Ok(())
}

impl ResultReporter for HttpReporter {
    fn submit(&self, result: GameResult) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        let handle = thread::spawn(move || match post_result(&client, &endpoint, &result) {
            Ok(()) => info!(
                score = result.score,
                game_id = result.game_id,
                time = result.time,
                "game result submitted"
            ),
            Err(e) => warn!(
                error = %e,
                endpoint = %endpoint,
                score = result.score,
                "failed to submit game result"
            ),
        });

        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|h| !h.is_finished());
            pending.push(handle);
        }
    }

    fn flush(&self) {
        let handles = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => return,
        };

        debug!(count = handles.len(), "waiting for pending submissions");
        for handle in handles {
            let _ = handle.join();
        }
    }
}

/// Reporter used with `--offline`: results are only written to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ResultReporter for LogReporter {
    fn submit(&self, result: GameResult) {
        info!(
            score = result.score,
            user_id = ?result.user_id,
            game_id = result.game_id,
            time = result.time,
            "offline: game result not submitted"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;

    fn sample_result() -> GameResult {
        GameResult {
            score: 160,
            user_id: Some("42".to_string()),
            game_id: 2,
            time: 37,
        }
    }

    /// Accept one connection, answer with `status`, and hand back the raw request.
    fn one_shot_server(status: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/game-results/", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];

            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);

                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length")
                                .then(|| v.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            stream.write_all(response.as_bytes()).unwrap();
            let _ = tx.send(String::from_utf8_lossy(&raw).to_string());
        });

        (url, rx)
    }

    fn body_of(request: &str) -> GameResult {
        let (_, body) = request.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_game_result_json_shape() {
        let json = serde_json::to_value(sample_result()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"score": 160, "user_id": "42", "game_id": 2, "time": 37})
        );
    }

    #[test]
    fn test_unknown_player_serializes_as_null() {
        let result = GameResult {
            user_id: None,
            ..sample_result()
        };
        let json = serde_json::to_value(result).unwrap();
        assert!(json["user_id"].is_null());
    }

    #[test]
    fn test_post_sends_json_body() {
        let (url, rx) = one_shot_server("200 OK");
        let reporter = HttpReporter::new(url).unwrap();

        reporter.post(&sample_result()).unwrap();

        let request = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(request.starts_with("POST /api/game-results/ HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert_eq!(body_of(&request), sample_result());
    }

    #[test]
    fn test_post_reports_rejection() {
        let (url, _rx) = one_shot_server("500 Internal Server Error");
        let reporter = HttpReporter::new(url).unwrap();

        assert_matches!(reporter.post(&sample_result()), Err(Error::Rejected(500)));
    }

    #[test]
    fn test_post_unreachable_is_http_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let reporter = HttpReporter::new(format!("http://{addr}/")).unwrap();

        assert_matches!(reporter.post(&sample_result()), Err(Error::Http(_)));
    }

    #[test]
    fn test_submit_then_flush_delivers() {
        let (url, rx) = one_shot_server("201 Created");
        let reporter = HttpReporter::new(url).unwrap();

        reporter.submit(sample_result());
        reporter.flush();

        let request = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(body_of(&request), sample_result());
    }

    #[test]
    fn test_submit_failure_is_silent() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let reporter = HttpReporter::new(format!("http://{addr}/")).unwrap();

        reporter.submit(sample_result());
        reporter.flush();
    }

    #[test]
    fn test_log_reporter_accepts_results() {
        let reporter = LogReporter;
        reporter.submit(sample_result());
        reporter.flush();
    }
}
