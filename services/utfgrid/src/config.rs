//! Render job configuration.
//!
//! A job is described by an optional YAML file plus command line flags.
//! Flags take precedence over file values; anything left unset falls back to
//! the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use grid_common::{Extent, GridError, GridResult, Request};
use renderer::DEFAULT_RESOLUTION;
use serde::{Deserialize, Serialize};

/// Default request width and height in pixels.
pub const DEFAULT_SIZE: u32 = 256;

/// Default JSON indentation.
pub const DEFAULT_INDENT: usize = 4;

/// Default attribute holding the feature id.
pub const DEFAULT_ID_FIELD: &str = "id";

/// A complete render job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// GeoJSON file with the features to rasterize
    pub input: Option<PathBuf>,

    /// Geographic extent as "minx,miny,maxx,maxy"
    pub bbox: Option<String>,

    /// Request width in pixels
    pub width: u32,

    /// Request height in pixels
    pub height: u32,

    /// Pixels per grid cell along each axis
    pub resolution: u32,

    /// Attributes to extract for each feature
    pub fields: Vec<String>,

    /// Attribute holding the integer feature id
    pub id_field: String,

    /// Output path; stdout when unset
    pub output: Option<PathBuf>,

    /// JSON indentation; 0 writes compact JSON
    pub indent: usize,

    /// Search scan lines on the rayon thread pool
    pub parallel: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            input: None,
            bbox: None,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            resolution: DEFAULT_RESOLUTION,
            fields: Vec::new(),
            id_field: DEFAULT_ID_FIELD.to_string(),
            output: None,
            indent: DEFAULT_INDENT,
            parallel: false,
        }
    }
}

/// Values given on the command line. `None` leaves the file value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOverrides {
    pub input: Option<PathBuf>,
    pub bbox: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resolution: Option<u32>,
    pub fields: Option<Vec<String>>,
    pub id_field: Option<String>,
    pub output: Option<PathBuf>,
    pub indent: Option<usize>,
    pub parallel: bool,
}

impl RenderConfig {
    /// Load a job from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> GridResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| match e {
            GridError::InvalidConfig { message, .. } => GridError::InvalidConfig {
                param: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse a job from YAML text.
    pub fn from_yaml(content: &str) -> GridResult<Self> {
        serde_yaml::from_str(content).map_err(|e| GridError::InvalidConfig {
            param: "job file".to_string(),
            message: e.to_string(),
        })
    }

    /// Apply command line values on top of this configuration.
    pub fn merge(mut self, overrides: RenderOverrides) -> Self {
        if let Some(input) = overrides.input {
            self.input = Some(input);
        }
        if let Some(bbox) = overrides.bbox {
            self.bbox = Some(bbox);
        }
        if let Some(width) = overrides.width {
            self.width = width;
        }
        if let Some(height) = overrides.height {
            self.height = height;
        }
        if let Some(resolution) = overrides.resolution {
            self.resolution = resolution;
        }
        if let Some(fields) = overrides.fields {
            self.fields = fields;
        }
        if let Some(id_field) = overrides.id_field {
            self.id_field = id_field;
        }
        if let Some(output) = overrides.output {
            self.output = Some(output);
        }
        if let Some(indent) = overrides.indent {
            self.indent = indent;
        }
        self.parallel |= overrides.parallel;
        self
    }

    /// Check the job before any work starts.
    pub fn validate(&self) -> GridResult<()> {
        if self.input.is_none() {
            return Err(invalid("input", "no input file given"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(invalid(
                "size",
                format!("{}x{} request has no pixels", self.width, self.height),
            ));
        }
        if self.resolution == 0 {
            return Err(invalid("resolution", "must be at least 1"));
        }
        if self.fields.is_empty() {
            return Err(GridError::NoValidFields { requested: Vec::new() });
        }
        if self.id_field.is_empty() {
            return Err(invalid("id_field", "must not be empty"));
        }

        let extent = self.extent()?;
        if !(extent.width() > 0.0 && extent.height() > 0.0) {
            return Err(invalid("bbox", format!("{} has no area", extent)));
        }

        Ok(())
    }

    /// Parsed extent of the job.
    pub fn extent(&self) -> GridResult<Extent> {
        let bbox = self
            .bbox
            .as_deref()
            .ok_or_else(|| invalid("bbox", "no extent given"))?;
        Ok(Extent::from_bbox_string(bbox)?)
    }

    /// The pixel request described by this job.
    pub fn request(&self) -> GridResult<Request> {
        Ok(Request::new(self.width, self.height, self.extent()?))
    }
}

fn invalid(param: &str, message: impl Into<String>) -> GridError {
    GridError::InvalidConfig {
        param: param.to_string(),
        message: message.into(),
    }
}
