//! # Quire CLI
//!
//! Usage:
//!   quire document.json
//!   quire document.json --config layout.json --dpi 96
//!   quire document.json --width 500 --height 700 --ops > ops.json
//!   quire --example > report.json
//!
//! Prints a summary of the pages, or with `--ops` the recorded draw
//! operations of every page as JSON. Set `RUST_LOG=debug` to follow the
//! split decisions.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use quire::draw::{self, RecordingSurface};
use quire::layout::LayoutContext;
use quire::text::MetricsMeasurer;
use quire::{Document, LayoutConfig, LayoutWarning, PageSetup, Paginator, QuireError, Resolution};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("✗ {e}");
        process::exit(1);
    }
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == name).map(|w| w[1].as_str())
}

fn number(args: &[String], name: &str) -> quire::Result<Option<f64>> {
    flag(args, name)
        .map(|v| {
            v.parse::<f64>()
                .map_err(|_| QuireError::Builder(format!("{name} expects a number, got {v:?}")))
        })
        .transpose()
}

fn run(args: &[String]) -> quire::Result<()> {
    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1])?
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };

    let config = match flag(args, "--config") {
        Some(path) => LayoutConfig::load(path)?,
        None => LayoutConfig::default(),
    };
    let document = Document::from_json(&input)?;

    let resolution = Resolution::uniform(number(args, "--dpi")?.unwrap_or(72.0));
    let paper_setup = document.paper.page_setup(resolution);
    let setup = PageSetup::new(
        number(args, "--width")?.unwrap_or(paper_setup.width),
        number(args, "--height")?.unwrap_or(paper_setup.height),
        resolution,
    );

    let measurer = MetricsMeasurer::new();
    let mut paginator = Paginator::new(document.root, setup, &measurer, &config);
    paginator.run()?;
    let warnings = paginator.warnings().to_vec();
    let pages = paginator.into_pages();

    if args.iter().any(|a| a == "--ops") {
        let ctx = LayoutContext::new(&measurer, resolution, &config);
        let mut all = Vec::with_capacity(pages.len());
        for page in &pages {
            let mut surface = RecordingSurface::new();
            draw::draw_page(page, &mut surface, &ctx, setup.width)?;
            all.push(surface.into_ops());
        }
        println!("{}", serde_json::to_string_pretty(&all)?);
    } else {
        for (i, page) in pages.iter().enumerate() {
            let kinds: Vec<String> = page
                .elements()
                .iter()
                .map(|e| format!("{:?}", e.element_type()))
                .collect();
            println!("page {}: {}", i + 1, kinds.join(", "));
        }
        let marks = pages.marks();
        if !marks.is_empty() {
            println!("{} index marks", marks.len());
        }
    }

    for warning in &warnings {
        match warning {
            LayoutWarning::Oversized {
                page,
                element,
                height,
                available,
            } => eprintln!(
                "! page {}: {element:?} is {height:.1} tall, {available:.1} available",
                page + 1
            ),
        }
    }
    eprintln!("✓ Paginated into {} pages", pages.len());
    Ok(())
}

fn example_report_json() -> &'static str {
    r##"{
  "paper": {
    "width": 21.0,
    "height": 29.7,
    "leftMargin": 2.54,
    "rightMargin": 2.54,
    "topMargin": 2.54,
    "bottomMargin": 2.54
  },
  "children": [
    {
      "kind": {
        "type": "paragraph",
        "style": {
          "font": { "face": "SansSerif", "size": 16.0, "bold": true },
          "bottomMargin": 0.4
        },
        "text": { "text": "Descendants of Ada Smith" },
        "marks": [
          { "offset": 0, "mark": { "key": "Descendants of Ada Smith", "kind": "tableOfContents", "level": 1 } }
        ]
      }
    },
    {
      "kind": {
        "type": "paragraph",
        "style": { "firstIndent": 0.5, "bottomMargin": 0.2 },
        "text": {
          "text": "Ada Smith was born in 1850 and married John Brown in 1872. They had three children, all of whom are listed below with their spouses.",
          "tags": [ { "kind": "Bold", "ranges": [[0, 9]] } ]
        },
        "marks": [
          { "offset": 0, "mark": { "key": "Smith, Ada", "kind": "alphabetical", "level": 1 } }
        ]
      }
    },
    {
      "kind": { "type": "table", "style": { "width": 100.0, "columnWidths": [30.0, 70.0] } },
      "children": [
        {
          "kind": { "type": "row" },
          "children": [
            {
              "kind": { "type": "cell", "style": { "borders": { "top": true, "right": true, "bottom": true, "left": true }, "padding": 0.1 } },
              "children": [ { "kind": { "type": "paragraph", "text": { "text": "Mary Brown" } } } ]
            },
            {
              "kind": { "type": "cell", "style": { "borders": { "top": true, "right": true, "bottom": true, "left": true }, "padding": 0.1 } },
              "children": [ { "kind": { "type": "paragraph", "text": { "text": "Born 1874, married Peter Green." } } } ]
            }
          ]
        }
      ]
    },
    { "kind": { "type": "pageBreak" } },
    {
      "kind": { "type": "frame", "style": { "width": 16.0, "height": 6.0, "align": "Center" } },
      "children": [
        {
          "kind": {
            "type": "box",
            "style": { "shadow": true, "fillColor": { "r": 1.0, "g": 1.0, "b": 0.8 } },
            "x": 1.0, "y": 1.0, "width": 6.0, "height": 1.5
          }
        },
        {
          "kind": {
            "type": "textLabel",
            "style": { "alignment": "Center" },
            "valign": "center",
            "text": "Ada Smith",
            "x": 4.0, "y": 1.75
          }
        },
        {
          "kind": {
            "type": "line",
            "style": { "lineStyle": "Dashed" },
            "start": [4.0, 2.5],
            "end": [4.0, 4.0]
          }
        }
      ]
    },
    { "kind": { "type": "alphabeticalIndex" } }
  ]
}
"##
}
