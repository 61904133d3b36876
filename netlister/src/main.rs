use clap::{Arg, ArgAction, Command};
use failure::{bail, format_err, Fallible};
use itertools::Itertools;
use log::info;
use schematic::geometry::AngleMode;
use schematic::point::SnapGrid;
use schematic::record::SchematicDocument;
use schematic::{Diagnostic, EngineConfig, Session};
use std::process::exit;

fn parse_grid(value: &str) -> Fallible<SnapGrid> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [major, minor] => Ok(SnapGrid::new(major.parse()?, minor.parse()?)),
        _ => bail!("--grid expects MAJOR,MINOR but got {}", value),
    }
}

fn go() -> Fallible<()> {
    let args = Command::new("netlister")
        .version("0.1.0")
        .about("Groups the nets of a schematic and resolves symbol pins to net names")
        .arg(
            Arg::new("input")
                .help("path to the schematic JSON file")
                .required(true),
        )
        .arg(
            Arg::new("grid")
                .help("snap grid as MAJOR,MINOR; overrides the document")
                .long("grid")
                .value_name("MAJOR,MINOR"),
        )
        .arg(
            Arg::new("diagonal")
                .help("allow 45 degree nets")
                .long("diagonal")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("split-crossings")
                .help("split nets where another net passes straight through")
                .long("split-crossings")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .help("write the tidied schematic here")
                .long("output")
                .short('o'),
        )
        .arg(
            Arg::new("strict")
                .help("fail if any name conflict was found")
                .long("strict")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let input = args
        .get_one::<String>("input")
        .ok_or_else(|| format_err!("no input file given"))?;
    let doc = SchematicDocument::load(input)?;

    let grid = match args.get_one::<String>("grid") {
        Some(grid) => parse_grid(grid)?,
        None => doc.snap_grid.unwrap_or_default(),
    };
    let angle_mode = if args.get_flag("diagonal") {
        AngleMode::Diagonal
    } else {
        AngleMode::Manhattan
    };
    let config = EngineConfig::default()
        .with_grid(grid)
        .with_angle_mode(angle_mode)
        .with_split_at_crossings(args.get_flag("split-crossings"));

    let mut session = Session::from_document(doc, config)?;
    let mut diagnostics: Vec<Diagnostic> = vec![];

    let tidied = session.tidy_all()?;
    info!(
        "tidy removed {} nets and added {}",
        tidied.edit.removed.len(),
        tidied.edit.added.len()
    );
    diagnostics.extend(tidied.diagnostics);

    let grouping = session.group_all_nets();
    diagnostics.extend(grouping.diagnostics);
    for (name, nets) in &grouping.nets {
        println!("{}: {}", name, nets.iter().join(", "));
    }

    let mapping = session.pin_net_maps();
    diagnostics.extend(mapping.diagnostics);
    for (instance, pins) in &mapping.maps {
        println!(
            "{} {}",
            instance,
            pins.iter().map(|(pin, net)| format!("{}={}", pin, net)).join(" ")
        );
    }

    for diag in &diagnostics {
        println!("{:?}: {}", diag.severity(), diag);
    }

    if let Some(output) = args.get_one::<String>("output") {
        session.to_document().save(output)?;
        info!("wrote {}", output);
    }

    let errors = diagnostics.iter().filter(|diag| diag.is_error()).count();
    if args.get_flag("strict") && errors > 0 {
        bail!("{} net name conflicts", errors);
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = go() {
        println!("Error: {}", e);
        exit(1);
    }
}
