use std::env;
use std::fs::File;
use std::io::prelude::*;

use yarrow_parser::{Event, Parser, ScanError, Span, SpannedEventReceiver};

#[derive(Debug)]
struct EventSink {
    events: Vec<(Event, Span)>,
}

impl SpannedEventReceiver for EventSink {
    fn on_event(&mut self, ev: Event, span: Span) {
        eprintln!(
            "{:>4}:{:<3} \x1B[;34m\u{21B3} {:?}\x1B[;m",
            span.start.line() + 1,
            span.start.col() + 1,
            &ev
        );
        self.events.push((ev, span));
    }
}

fn str_to_events(yaml: &str) -> Result<Vec<(Event, Span)>, ScanError> {
    let mut sink = EventSink { events: Vec::new() };
    let mut parser = Parser::new_from_str(yaml);
    // Load events using our sink as the receiver.
    parser.load(&mut sink, true)?;
    Ok(sink.events)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<_> = env::args().collect();
    let Some(path) = args.get(1) else {
        eprintln!("Usage: dump_events <file.yaml>");
        std::process::exit(2);
    };
    let mut f = File::open(path)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;

    let events = str_to_events(&s)?;
    eprintln!("{} events", events.len());
    Ok(())
}
