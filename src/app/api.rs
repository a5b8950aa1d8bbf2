//! HTTP surface, independent of any server implementation.
//!
//! Maps a request path and query string onto the [`LoggerService`] and
//! describes the response: status, headers and body.  The server adapter
//! only moves bytes.  Paths and plain-text replies stay byte-compatible
//! with the browser client shipped on the data partition.
//!
//! | Path                   | Reply                                  |
//! |------------------------|----------------------------------------|
//! | `/api/sensorwerte`     | telemetry JSON (fresh pressure sample) |
//! | `/getTime`             | canonical timestamp, text              |
//! | `/setTime?timestamp=N` | `Zeit aktualisiert` or 400             |
//! | `/downloadlog`         | CSV attachment or 404                  |
//! | `/toggleRecording`     | `{"recording":bool}`                   |
//! | `/deleteLog`           | `Log gelöscht`                         |
//! | `/clearCumulativeFlow` | `Flow zurückgesetzt`                   |
//! | `/`, `/styles.css`, `/script.js` | static files                 |

use log::warn;

use crate::error::{Error, RequestError, StorageError};

use super::commands::{AppCommand, CommandReply};
use super::ports::{EventSink, LogStorePort, PressurePort};
use super::service::LoggerService;
use super::telemetry::recording_json;

pub const CONTENT_TEXT: &str = "text/plain; charset=utf-8";
pub const CONTENT_JSON: &str = "application/json";
pub const CONTENT_CSV: &str = "text/csv";

pub const MSG_TIME_SET: &str = "Zeit aktualisiert";
pub const MSG_LOG_DELETED: &str = "Log gelöscht";
pub const MSG_FLOW_CLEARED: &str = "Flow zurückgesetzt";

/// Attachment header for the log download.
pub const LOG_DISPOSITION: &str = "attachment; filename=log.csv";

// ───────────────────────────────────────────────────────────────
// Routes
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Styles,
    Script,
    Telemetry,
    GetTime,
    SetTime,
    DownloadLog,
    ToggleRecording,
    DeleteLog,
    ClearCumulativeFlow,
}

impl Route {
    pub const ALL: [Route; 10] = [
        Route::Index,
        Route::Styles,
        Route::Script,
        Route::Telemetry,
        Route::GetTime,
        Route::SetTime,
        Route::DownloadLog,
        Route::ToggleRecording,
        Route::DeleteLog,
        Route::ClearCumulativeFlow,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Index => "/",
            Route::Styles => "/styles.css",
            Route::Script => "/script.js",
            Route::Telemetry => "/api/sensorwerte",
            Route::GetTime => "/getTime",
            Route::SetTime => "/setTime",
            Route::DownloadLog => "/downloadlog",
            Route::ToggleRecording => "/toggleRecording",
            Route::DeleteLog => "/deleteLog",
            Route::ClearCumulativeFlow => "/clearCumulativeFlow",
        }
    }

    /// Match a request URI.  Anything after `?` is ignored.
    pub fn from_path(uri: &str) -> Option<Route> {
        let path = uri.split_once('?').map_or(uri, |(p, _)| p);
        Self::ALL.into_iter().find(|r| r.path() == path)
    }
}

/// Split a request URI into `(path, query)`.
pub fn split_uri(uri: &str) -> (&str, Option<&str>) {
    match uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (uri, None),
    }
}

// ───────────────────────────────────────────────────────────────
// Static assets
// ───────────────────────────────────────────────────────────────

/// A file on the data partition served verbatim.
#[derive(Debug, PartialEq, Eq)]
pub struct StaticAsset {
    pub route: Route,
    /// Name relative to the storage mount point.
    pub file: &'static str,
    pub content_type: &'static str,
}

pub static STATIC_ASSETS: [StaticAsset; 3] = [
    StaticAsset {
        route: Route::Index,
        file: "index.html",
        content_type: "text/html",
    },
    StaticAsset {
        route: Route::Styles,
        file: "styles.css",
        content_type: "text/css",
    },
    StaticAsset {
        route: Route::Script,
        file: "script.js",
        content_type: "application/javascript",
    },
];

fn asset_for(route: Route) -> Option<&'static StaticAsset> {
    STATIC_ASSETS.iter().find(|a| a.route == route)
}

// ───────────────────────────────────────────────────────────────
// Query parsing
// ───────────────────────────────────────────────────────────────

/// Extract the `timestamp` parameter as signed base-10 epoch seconds.
///
/// The first `timestamp=` pair wins.  Range checking is left to the clock.
pub fn parse_timestamp_query(query: Option<&str>) -> Result<i64, RequestError> {
    let value = query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .find_map(|pair| match pair.split_once('=') {
            Some(("timestamp", v)) => Some(v),
            None if pair == "timestamp" => Some(""),
            _ => None,
        })
        .ok_or(RequestError::MissingTimestamp)?;

    value
        .trim()
        .parse::<i64>()
        .map_err(|_| RequestError::MalformedTimestamp)
}

// ───────────────────────────────────────────────────────────────
// Responses
// ───────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
pub enum Body {
    Text(String),
    /// Stream the CSV log from the store; `len` bytes at request time.
    LogFile { len: u64 },
    /// Stream a file from the data partition.
    Asset(&'static StaticAsset),
}

#[derive(Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub content_disposition: Option<&'static str>,
    pub body: Body,
}

impl ApiResponse {
    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: CONTENT_TEXT,
            content_disposition: None,
            body: Body::Text(body.into()),
        }
    }

    fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: CONTENT_JSON,
            content_disposition: None,
            body: Body::Text(body),
        }
    }

    /// Map a domain error to a status code with a plain-text reason.
    pub fn from_error(e: Error) -> Self {
        let status = match e {
            Error::Request(_) => 400,
            Error::Storage(StorageError::NotFound) => 404,
            _ => 500,
        };
        Self::text(status, e.to_string())
    }

    pub fn not_found() -> Self {
        Self::text(404, "Not found")
    }
}

/// Serve one request.
pub fn handle<A, S>(
    service: &mut LoggerService<A, S>,
    route: Route,
    query: Option<&str>,
    now_ms: u64,
    sink: &mut impl EventSink,
) -> ApiResponse
where
    A: PressurePort,
    S: LogStorePort,
{
    let result = match route {
        Route::Index | Route::Styles | Route::Script => {
            return match asset_for(route) {
                Some(asset) => ApiResponse {
                    status: 200,
                    content_type: asset.content_type,
                    content_disposition: None,
                    body: Body::Asset(asset),
                },
                None => ApiResponse::not_found(),
            };
        }
        Route::Telemetry => {
            let snapshot = service.telemetry(sink);
            snapshot.to_json().map(ApiResponse::json).map_err(|e| {
                warn!("telemetry serialisation failed: {}", e);
                Error::Encode("telemetry")
            })
        }
        Route::GetTime => Ok(ApiResponse::text(200, service.timestamp(now_ms).as_str())),
        Route::SetTime => parse_timestamp_query(query)
            .map_err(Error::from)
            .and_then(|local| service.handle_command(AppCommand::SetLocalTime(local), now_ms, sink))
            .map(|_| ApiResponse::text(200, MSG_TIME_SET)),
        Route::DownloadLog => service
            .store()
            .size()
            .map(|len| ApiResponse {
                status: 200,
                content_type: CONTENT_CSV,
                content_disposition: Some(LOG_DISPOSITION),
                body: Body::LogFile { len },
            })
            .map_err(Error::from),
        Route::ToggleRecording => service
            .handle_command(AppCommand::ToggleRecording, now_ms, sink)
            .and_then(|reply| match reply {
                CommandReply::Recording(armed) => recording_json(armed)
                    .map(ApiResponse::json)
                    .map_err(|_| Error::Encode("recording state")),
                _ => Err(Error::Encode("unexpected reply")),
            }),
        Route::DeleteLog => service
            .handle_command(AppCommand::DeleteLog, now_ms, sink)
            .map(|_| ApiResponse::text(200, MSG_LOG_DELETED)),
        Route::ClearCumulativeFlow => service
            .handle_command(AppCommand::ClearCumulativeFlow, now_ms, sink)
            .map(|_| ApiResponse::text(200, MSG_FLOW_CLEARED)),
    };

    result.unwrap_or_else(|e| {
        warn!("{} -> {}", route.path(), e);
        ApiResponse::from_error(e)
    })
}
