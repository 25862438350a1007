use anyhow::Context;
use jmap::prelude::*;
use std::sync::Arc;

/// Renders a map on a headless page and prints what the widget did.
///
/// Usage: `jmap-app [options.json]`. The file holds the same options object
/// the widget accepts, e.g. `{ "type": "terrain", "aspectRatio": "4/3" }`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    jmap::init_logging();

    let options = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading options from {path}"))?;
            MapOptions::from_json(&json).with_context(|| format!("parsing {path}"))?
        }
        None => MapOptions::default(),
    };

    let mut document = Document::with_viewport_width(1200.0);
    let map = document.append(document.root(), Element::new("div").with_id("map"))?;
    for (lat, lng, name) in [
        ("59.9139", "10.7522", "<b>Oslo</b>"),
        ("60.3913", "5.3221", "<b>Bergen</b>"),
        ("63.4305", "10.3951", "<b>Trondheim</b>"),
    ] {
        document.append(
            map,
            Element::new("div")
                .with_class("marker")
                .with_data("lat", lat)
                .with_data("lng", lng)
                .with_markup(name),
        )?;
    }

    let page = Page::headless(document)
        .with_geolocation(Arc::new(StaticLocator::new(LatLng::new(58.97, 5.73))));
    let mut plugin = JMapPlugin::new(page);

    let options = MapOptionsBuilder::from_options(options)
        .after_center(|map: &JMap| {
            log::info!("centered on {:?}", map.center());
        })
        .build();
    plugin.apply(&[map], &options)?;

    print_state(&mut plugin, map, "initial view")?;

    plugin.trigger_marker_event(map, 0, "click")?;
    let open = plugin
        .instance(map)
        .map(|instance| {
            instance
                .placed_markers()
                .iter()
                .filter(|marker| marker.popup().is_some_and(Popup::is_open))
                .count()
        })
        .unwrap_or(0);
    log::info!("{open} popup(s) open after clicking the first marker");

    plugin.call(&[map], "geoCenter", &[])?;
    for (element, status) in plugin.settle().await {
        log::info!("geolocation for element {element}: {status:?}");
    }
    print_state(&mut plugin, map, "after geolocation")?;

    plugin.call(&[map], "destroy", &[])?;
    log::info!(
        "destroyed; element markup is now {:?}",
        plugin.page().document.inner_html(map)
    );

    Ok(())
}

fn print_state(plugin: &mut JMapPlugin, map: ElementId, label: &str) -> anyhow::Result<()> {
    if let CallOutcome::Value(value) = plugin.call(&[map], "get", &[])? {
        println!("{label}: {}", serde_json::to_string_pretty(&value.to_json()?)?);
    }
    Ok(())
}
