//! Files handed to the user: the route map and the tour description.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pulldown_cmark::{Options, Parser, html};

use crate::Result;
use crate::reconcile::ReconciledRoute;
use crate::utils::{bounds_of, create_linestring_geojson};

pub const ROUTE_MAP_FILE: &str = "route_map.html";
pub const DESCRIPTION_MARKDOWN_FILE: &str = "tour.md";
pub const DESCRIPTION_HTML_FILE: &str = "tour.html";

/// Standalone Leaflet page with a marker per stop and the path in red.
pub fn route_map_html(title: &str, route: &ReconciledRoute) -> Result<String> {
    let mut markers_js = String::new();
    for (i, stop) in route.stops.iter().enumerate() {
        let label = serde_json::to_string(&escape_html(&format!("{}. {}", i + 1, stop.name)))?;
        markers_js.push_str(&format!(
            "L.marker([{lat}, {lon}]).addTo(map).bindPopup({label}).bindTooltip({label});\n",
            lat = stop.latitude,
            lon = stop.longitude,
            label = label
        ));
    }

    let mut all_points: Vec<(f64, f64)> = route.stops.iter().map(|s| s.lat_lon()).collect();
    all_points.extend_from_slice(&route.geometry);
    let fit_js = match bounds_of(&all_points) {
        Some(((s, w), (n, e))) => format!("map.fitBounds([[{s}, {w}], [{n}, {e}]]);"),
        None => "map.setView([0, 0], 2);".to_string(),
    };

    let path_js = if route.geometry.is_empty() {
        String::new()
    } else {
        format!(
            "L.geoJSON({}, {{ style: {{ color: 'red', weight: 4, opacity: 0.8 }} }}).addTo(map);",
            create_linestring_geojson(&route.geometry)
        )
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8" />
  <title>{title}</title>
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
</head>
<body>
  <div id="map" style="width: 100%; height: 100vh;"></div>
  <script>
    var map = L.map('map');
    L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
      attribution: '&copy; OpenStreetMap contributors'
    }}).addTo(map);
    {path_js}
    {markers_js}
    {fit_js}
  </script>
</body>
</html>"#,
        title = escape_html(title),
        path_js = path_js,
        markers_js = markers_js,
        fit_js = fit_js
    );
    Ok(html)
}

/// Render the markdown tour description as a small HTML document.
pub fn description_html(title: &str, markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut body = String::new();
    html::push_html(&mut body, parser);
    format!(
        concat!(
            "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\" />\n",
            "  <title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n"
        ),
        escape_html(title),
        body
    )
}

pub fn write_route_map(dir: &Path, title: &str, route: &ReconciledRoute) -> Result<PathBuf> {
    let path = dir.join(ROUTE_MAP_FILE);
    fs::write(&path, route_map_html(title, route)?)?;
    log::info!("wrote {}", path.display());
    Ok(path)
}

/// Writes both the markdown and the HTML rendering; returns the HTML path.
pub fn write_description(dir: &Path, title: &str, markdown: &str) -> Result<PathBuf> {
    fs::write(dir.join(DESCRIPTION_MARKDOWN_FILE), markdown)?;
    let path = dir.join(DESCRIPTION_HTML_FILE);
    fs::write(&path, description_html(title, markdown))?;
    log::info!("wrote {}", path.display());
    Ok(path)
}

/// Hand `path` to `opener`. A failure is logged and reported as `false`,
/// since the files are already written.
pub fn open_in_browser(path: &Path, opener: impl FnOnce(&Path) -> io::Result<()>) -> bool {
    match opener(path) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("could not open {} in a browser: {e}", path.display());
            false
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
