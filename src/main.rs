//! # Studysheet CLI
//!
//! Usage:
//!   studysheet request.json -o pages.json
//!   echo '{ ... }' | studysheet -o pages.json
//!   studysheet --example > request.json
//!
//! Set `RUST_LOG=debug` to see page flow decisions.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_request_json());
        return;
    }

    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).map_err(|e| format!("Failed to read {}: {}", args[1], e))
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map(|_| buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))
    };
    let input = match input {
        Ok(input) => input,
        Err(msg) => fail(&msg),
    };

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "pages.json".to_string());

    match studysheet::render_to_json(&input) {
        Ok(json) => {
            if let Err(e) = fs::write(&output_path, &json) {
                fail(&format!("Failed to write {}: {}", output_path, e));
            }
            eprintln!("✓ Written {} bytes to {}", json.len(), output_path);
        }
        Err(e) => fail(&format!("Failed to render note: {}", e)),
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("✗ {}", msg);
    process::exit(1);
}

fn example_request_json() -> &'static str {
    r##"{
  "note": {
    "title": "Photosynthesis",
    "keyConcepts": [
      {
        "title": "Chlorophyll",
        "definition": "The green pigment in chloroplasts that absorbs red and blue light and drives the light reactions."
      },
      {
        "title": "Calvin Cycle",
        "definition": "The light-independent reactions that fix carbon dioxide into three-carbon sugars using ATP and NADPH."
      },
      {
        "title": "Stomata",
        "definition": "Pores on the leaf surface that regulate gas exchange and water loss."
      }
    ],
    "summaryPoints": [
      {
        "heading": "Inputs and Outputs",
        "points": [
          "Light, water and carbon dioxide go in.",
          "Glucose and oxygen come out."
        ]
      },
      {
        "heading": "Where It Happens",
        "points": [
          "Light reactions run in the thylakoid membranes.",
          "The Calvin cycle runs in the stroma."
        ]
      }
    ],
    "processFlow": [
      { "step": 1, "title": "Light absorption", "description": "Chlorophyll absorbs photons and excites electrons." },
      { "step": 2, "title": "Water splitting", "description": "Water is split, releasing oxygen and supplying electrons." },
      { "step": 3, "title": "ATP and NADPH", "description": "The electron transport chain produces ATP and NADPH." },
      { "step": 4, "title": "Carbon fixation", "description": "RuBisCO fixes CO2 and the cycle builds G3P." }
    ],
    "originalContent": ""
  },
  "options": {
    "theme": "modern",
    "colorScheme": "green",
    "pageSize": "A4",
    "overflow": "PageBreak"
  }
}
"##
}
