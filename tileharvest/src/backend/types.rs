//! Request and reply types exchanged with the tile backend.

use serde::Deserialize;
use thiserror::Error;

use crate::coord::{BoundingBox, GeoPoint, TileCoord};

/// Application code the backend uses for success.
pub const SUCCESS_CODE: i64 = 200;

/// Errors from backend calls other than tile downloads.
///
/// Tile downloads never fail with this type; their outcome is a
/// [`TileResponse`] so that one bad tile cannot abort the job.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    #[error("request to {endpoint} failed: {reason}")]
    Transport {
        endpoint: &'static str,
        reason: String,
    },

    #[error("HTTP {status} from {endpoint}")]
    HttpStatus { endpoint: &'static str, status: u16 },

    #[error("invalid reply from {endpoint}: {reason}")]
    InvalidReply {
        endpoint: &'static str,
        reason: String,
    },
}

/// Where and how the backend stores downloaded tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub directory: String,
    pub file_pattern: String,
    pub file_type: String,
    pub scale: u32,
}

impl OutputTarget {
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self {
            directory: String::new(),
            file_pattern: "{z}/{x}/{y}.png".to_string(),
            file_type: "png".to_string(),
            scale: 1,
        }
    }
}

/// Parameters identifying one download job, sent with every job-level call.
#[derive(Debug, Clone, PartialEq)]
pub struct JobParams {
    pub max_zoom: u8,
    pub output: OutputTarget,
    /// Tile source URL template, forwarded verbatim.
    pub source: String,
    /// Epoch milliseconds when the job was created.
    pub timestamp: i64,
    pub bounds: BoundingBox,
    pub center: GeoPoint,
    pub launch_location: GeoPoint,
    /// Selection area in square metres.
    pub area_m2: f64,
}

impl JobParams {
    /// Multipart form fields in the order the backend expects them.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("maxZoom", self.max_zoom.to_string()),
            ("outputDirectory", self.output.directory.clone()),
            ("outputFile", self.output.file_pattern.clone()),
            ("outputType", self.output.file_type.clone()),
            ("outputScale", self.output.scale.to_string()),
            ("source", self.source.clone()),
            ("timestamp", self.timestamp.to_string()),
            (
                "bounds",
                format!(
                    "{},{},{},{}",
                    self.bounds.west(),
                    self.bounds.south(),
                    self.bounds.east(),
                    self.bounds.north()
                ),
            ),
            ("center", lng_lat(&self.center)),
            ("launchLocation", lng_lat(&self.launch_location)),
            ("area", self.area_m2.to_string()),
        ]
    }
}

fn lng_lat(point: &GeoPoint) -> String {
    format!("{},{}", point.longitude, point.latitude)
}

/// One tile download request.
#[derive(Debug, Clone, Copy)]
pub struct TileRequest<'a> {
    pub coord: TileCoord,
    pub params: &'a JobParams,
}

impl<'a> TileRequest<'a> {
    pub fn new(coord: TileCoord, params: &'a JobParams) -> Self {
        Self { coord, params }
    }

    /// Tile address followed by the job's fields.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("x", self.coord.x.to_string()),
            ("y", self.coord.y.to_string()),
            ("z", self.coord.z.to_string()),
            ("quad", self.coord.quadkey()),
        ];
        fields.extend(self.params.form_fields());
        fields
    }
}

/// A tile the backend fetched and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePayload {
    /// Backend status text for the tile.
    pub message: String,
    /// Base64 preview image as sent by the backend; not decoded here.
    pub image: Option<String>,
}

/// Typed outcome of a tile download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileResponse {
    Success(TilePayload),
    /// The backend answered but reported a non-success code.
    ApplicationError { code: i64, message: String },
    /// No usable answer: connection error, timeout, bad HTTP status or body.
    TransportError(String),
}

#[derive(Debug, Deserialize)]
struct TileReplyBody {
    code: i64,
    #[serde(default)]
    message: serde_json::Value,
    #[serde(default)]
    image: Option<String>,
}

impl TileResponse {
    /// Classifies a `/download-tile` reply body.
    pub fn from_json(body: &[u8]) -> Self {
        let reply: TileReplyBody = match serde_json::from_slice(body) {
            Ok(reply) => reply,
            Err(e) => return TileResponse::TransportError(format!("invalid tile reply: {}", e)),
        };

        let message = message_text(&reply.message);
        if reply.code == SUCCESS_CODE {
            TileResponse::Success(TilePayload {
                message,
                image: reply.image,
            })
        } else {
            TileResponse::ApplicationError {
                code: reply.code,
                message,
            }
        }
    }
}

fn message_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Status of the backend's post-download generation task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    InProgress,
    Completed,
    Other(String),
}

impl TaskStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "in_progress" => TaskStatus::InProgress,
            "completed" => TaskStatus::Completed,
            other => TaskStatus::Other(other.to_string()),
        }
    }
}

/// Reply of `/task-status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatusReply {
    pub code: i64,
    /// Present when the reply carried `message.status`.
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize)]
struct TaskStatusBody {
    code: i64,
    #[serde(default)]
    message: serde_json::Value,
}

impl TaskStatusReply {
    pub fn new(code: i64, status: TaskStatus) -> Self {
        Self {
            code,
            status: Some(status),
        }
    }

    pub fn from_json(body: &[u8]) -> Result<Self, BackendError> {
        let body: TaskStatusBody =
            serde_json::from_slice(body).map_err(|e| BackendError::InvalidReply {
                endpoint: "/task-status",
                reason: e.to_string(),
            })?;

        let status = body
            .message
            .get("status")
            .and_then(|s| s.as_str())
            .map(TaskStatus::parse);

        Ok(Self {
            code: body.code,
            status,
        })
    }
}
