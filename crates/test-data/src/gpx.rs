//! GPX document generation from route points.
//!
//! Produces GPX 1.1 the way route-sharing services export planned routes, so
//! fixtures go through the same parser as downloaded routes.

use std::fmt::Write as _;

use ride_post::models::TrackPoint;

/// Where the points end up in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GpxLayout {
    /// `<trk><trkseg><trkpt>`, as exported by most services.
    #[default]
    Track,
    /// `<rte><rtept>`, as exported by planners without recorded tracks.
    Route,
}

/// Name, description and layout of a generated document.
#[derive(Debug, Clone, Default)]
pub struct GpxMeta {
    pub name: Option<String>,
    pub description: Option<String>,
    pub layout: GpxLayout,
}

impl GpxMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_layout(mut self, layout: GpxLayout) -> Self {
        self.layout = layout;
        self
    }
}

/// Generates a GPX 1.1 document from route points.
///
/// Name and description go into the metadata block. Points without an
/// elevation are written without `<ele>`.
pub fn generate_gpx(points: &[TrackPoint], meta: &GpxMeta) -> Vec<u8> {
    let mut gpx = String::new();

    gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    gpx.push('\n');
    gpx.push_str(r#"<gpx version="1.1" creator="ride-post-test-data""#);
    gpx.push_str(r#" xmlns="http://www.topografix.com/GPX/1/1">"#);
    gpx.push('\n');

    if meta.name.is_some() || meta.description.is_some() {
        gpx.push_str("  <metadata>\n");
        if let Some(name) = &meta.name {
            let _ = writeln!(gpx, "    <name>{}</name>", escape_xml(name));
        }
        if let Some(description) = &meta.description {
            let _ = writeln!(gpx, "    <desc>{}</desc>", escape_xml(description));
        }
        gpx.push_str("  </metadata>\n");
    }

    let (open, close, point_tag) = match meta.layout {
        GpxLayout::Track => ("  <trk>\n    <trkseg>\n", "    </trkseg>\n  </trk>\n", "trkpt"),
        GpxLayout::Route => ("  <rte>\n", "  </rte>\n", "rtept"),
    };

    gpx.push_str(open);
    for point in points {
        let _ = write!(
            gpx,
            r#"      <{point_tag} lat="{:.7}" lon="{:.7}">"#,
            point.location.latitude, point.location.longitude
        );
        if let Some(ele) = point.elevation {
            let _ = write!(gpx, "<ele>{ele:.2}</ele>");
        }
        let _ = writeln!(gpx, "</{point_tag}>");
    }
    gpx.push_str(close);
    gpx.push_str("</gpx>\n");

    gpx.into_bytes()
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
