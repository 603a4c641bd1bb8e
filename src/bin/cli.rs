use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use std::io::{self, Write};
use time_scheduler::{
    Direction, Position, Span, Timeline, load_timeline_from_csv, load_timeline_from_json,
    logging, save_timeline_to_csv, save_timeline_to_json,
};

const COLUMNS: [&str; 7] = ["id", "color", "kind", "from", "to", "position", "duration"];

fn position_cells(position: &Position) -> Vec<String> {
    let mut cells = vec![
        position.id.to_string(),
        position.color.clone(),
        position.kind().to_string(),
    ];
    match &position.span {
        Span::Range { from, to } => {
            cells.push(from.to_rfc3339_opts(SecondsFormat::AutoSi, true));
            cells.push(to.to_rfc3339_opts(SecondsFormat::AutoSi, true));
            cells.push(String::new());
            cells.push(String::new());
        }
        Span::Offset {
            position: offset,
            duration,
        } => {
            cells.push(String::new());
            cells.push(String::new());
            cells.push(offset.to_string());
            cells.push(duration.to_string());
        }
    }
    cells
}

fn render_positions_as_text_table(positions: &[Position]) -> String {
    let rows: Vec<Vec<String>> = positions.iter().map(position_cells).collect();

    let mut widths: Vec<usize> = COLUMNS.iter().map(|n| n.len()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[&str]| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&COLUMNS));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&render_row(&cells));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_timeline(timeline: &Timeline) -> String {
    match timeline.positions() {
        Ok(positions) => render_positions_as_text_table(&positions),
        Err(e) => format!("Error reading timeline: {e}"),
    }
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC).
fn parse_instant(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn print_help() {
    println!(
        "Commands:\n  help                                        Show this help\n  show                                        Show current timeline\n  new                                         Append offset position with next id and default color\n  add range <id> <color> <from> <to>          Upsert a date-range position (RFC 3339 or YYYY-MM-DD)\n  add offset <id> <color> <position> <duration>\n                                              Upsert an offset position\n  color <id> <color>                          Recolor a position\n  delete <id>                                 Delete a position\n  summary                                     Show timeline summary\n  direction <left|right|1|2>                  Describe a direction\n  meta show                                   Show timeline metadata\n  meta name <text...>                         Update timeline name\n  meta desc <text...>                         Update timeline description\n  meta color <color>                          Update default color\n  save <json|csv> <path>                      Persist timeline to disk\n  load <json|csv> <path>                      Load timeline from disk\n  quit|exit                                   Exit"
    );
}

fn print_metadata(timeline: &Timeline) {
    let metadata = timeline.metadata();
    println!("Timeline name      : {}", metadata.name);
    println!("Description        : {}", metadata.description);
    println!("Default color      : {}", metadata.default_color);
}

fn rest_of_line<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

fn handle_add<'a>(timeline: &mut Timeline, mut parts: impl Iterator<Item = &'a str>) {
    let kind = parts.next();
    let id_s = parts.next();
    let color = parts.next();
    let first = parts.next();
    let second = parts.next();
    let (Some(kind), Some(id_s), Some(color), Some(first), Some(second)) =
        (kind, id_s, color, first, second)
    else {
        println!("Usage: add range <id> <color> <from> <to> | add offset <id> <color> <position> <duration>");
        return;
    };
    let id: i32 = match id_s.parse() {
        Ok(v) => v,
        Err(_) => {
            println!("Invalid id");
            return;
        }
    };
    let position = match kind {
        "range" => match (parse_instant(first), parse_instant(second)) {
            (Some(from), Some(to)) => Position::range(id, color, from, to),
            _ => {
                println!("Invalid timestamp (RFC 3339 or YYYY-MM-DD)");
                return;
            }
        },
        "offset" => match (first.parse::<f64>(), second.parse::<f64>()) {
            (Ok(offset), Ok(duration)) => Position::offset(id, color, offset, duration),
            _ => {
                println!("Invalid number");
                return;
            }
        },
        other => {
            println!("Unknown position kind '{other}' (expected range or offset)");
            return;
        }
    };
    match timeline.upsert_position(position) {
        Ok(()) => {
            println!("Position upserted.");
            println!("{}", render_timeline(timeline));
        }
        Err(e) => println!("Error: {}", e),
    }
}

fn handle_meta<'a>(timeline: &mut Timeline, mut parts: impl Iterator<Item = &'a str>) {
    match parts.next() {
        Some("show") | None => print_metadata(timeline),
        Some("name") => match timeline.set_name(rest_of_line(parts)) {
            Ok(()) => println!("Timeline name updated."),
            Err(e) => println!("Error: {}", e),
        },
        Some("desc") => {
            timeline.set_description(rest_of_line(parts));
            println!("Timeline description updated.");
        }
        Some("color") => match timeline.set_default_color(rest_of_line(parts)) {
            Ok(()) => println!("Default color updated."),
            Err(e) => println!("Error: {}", e),
        },
        Some(other) => println!("Unknown meta command '{other}'"),
    }
}

fn handle_direction(arg: Option<&str>) {
    let Some(arg) = arg else {
        println!("Usage: direction <left|right|1|2>");
        return;
    };
    let parsed = match arg.parse::<u8>() {
        Ok(code) => Direction::try_from(code),
        Err(_) => arg.parse::<Direction>(),
    };
    match parsed {
        Ok(direction) => println!(
            "direction={} code={} opposite={}",
            direction,
            direction.value(),
            direction.opposite()
        ),
        Err(e) => println!("Error: {}", e),
    }
}

fn handle_save(timeline: &Timeline, format: Option<&str>, path: Option<&str>) {
    let (Some(format), Some(path)) = (format, path) else {
        println!("Usage: save <json|csv> <path>");
        return;
    };
    let result = match format {
        "json" => save_timeline_to_json(timeline, path),
        "csv" => save_timeline_to_csv(timeline, path),
        other => {
            println!("Unknown format '{other}' (expected json or csv)");
            return;
        }
    };
    match result {
        Ok(()) => println!("Timeline saved to {path}"),
        Err(e) => println!("Error saving timeline: {}", e),
    }
}

fn handle_load(timeline: &mut Timeline, format: Option<&str>, path: Option<&str>) {
    let (Some(format), Some(path)) = (format, path) else {
        println!("Usage: load <json|csv> <path>");
        return;
    };
    let result = match format {
        "json" => load_timeline_from_json(path),
        "csv" => load_timeline_from_csv(path),
        other => {
            println!("Unknown format '{other}' (expected json or csv)");
            return;
        }
    };
    match result {
        Ok(loaded) => {
            *timeline = loaded;
            println!("Timeline loaded from {path}");
            println!("{}", render_timeline(timeline));
        }
        Err(e) => println!("Error loading timeline: {}", e),
    }
}

fn main() {
    logging::init();

    let mut timeline = Timeline::new();

    println!("Time Scheduler (CLI) - type 'help' for commands\n");
    println!("{}", render_timeline(&timeline));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_timeline(&timeline)),
            "new" => {
                let id = match timeline.next_id() {
                    Ok(id) => id,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                let color = timeline.metadata().default_color.clone();
                match timeline.upsert_position(Position::offset(id, color, 0.0, 0.0)) {
                    Ok(()) => {
                        println!("Added position id={}", id);
                        println!("{}", render_timeline(&timeline));
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "add" => handle_add(&mut timeline, parts),
            "color" => match (parts.next(), parts.next()) {
                (Some(id_s), Some(color)) => match id_s.parse::<i32>() {
                    Ok(id) => match timeline.set_color(id, color) {
                        Ok(()) => {
                            println!("Color set.");
                            println!("{}", render_timeline(&timeline));
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    Err(_) => println!("Invalid id"),
                },
                _ => println!("Usage: color <id> <color>"),
            },
            "delete" => match parts.next() {
                Some(id_s) => match id_s.parse::<i32>() {
                    Ok(id) => match timeline.delete_position(id) {
                        Ok(true) => {
                            println!("Deleted position {id}.");
                            println!("{}", render_timeline(&timeline));
                        }
                        Ok(false) => println!("Position {id} not found."),
                        Err(e) => println!("Error deleting position: {}", e),
                    },
                    Err(_) => println!("Invalid id"),
                },
                None => println!("Usage: delete <id>"),
            },
            "summary" => match timeline.summary() {
                Ok(summary) => println!("Summary: {}", summary.to_cli_summary()),
                Err(e) => println!("Error: {}", e),
            },
            "direction" => handle_direction(parts.next()),
            "meta" => handle_meta(&mut timeline, parts),
            "save" => handle_save(&timeline, parts.next(), parts.next()),
            "load" => handle_load(&mut timeline, parts.next(), parts.next()),
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
    }
}
