/// Terminal front end for the wall picker
use std::io::Write;
use std::path::PathBuf;
use std::process;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;
use wall_picker::diagnostic;
use wall_picker::{
    FolderStore, Generated, PickerConfig, PickerError, Timer, TokioTimer, WallEvent, WallPicker,
    WallRenderer,
};

type StdinLines = Lines<BufReader<Stdin>>;

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  wall-picker [options] [file]      Start an interactive wall");
    eprintln!("  wall-picker [options] -           Read a list from stdin and pick once");
    eprintln!("  wall-picker --help                Show this help message");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --store <dir>    Directory holding the saved list (default: .wall-picker)");
    eprintln!("  --config <file>  JSON file with picker settings");
    eprintln!("  --seed <n>       Seed for deterministic picks (default: random)");
    eprintln!();
    eprintln!("Without a file the saved list is loaded, if there is one.");
}

fn print_commands() {
    println!("Commands:");
    println!("  show            Print the wall");
    println!("  enter           Type a new list, end with a line containing only '.'");
    println!("  generate        Rebuild the wall from the current list");
    println!("  pick            Pick a random item");
    println!("  remove          Remove the selected item");
    println!("  save | load     Save or load the list");
    println!("  export [path]   Write the items to a file");
    println!("  import <path>   Read a list from a file");
    println!("  help | quit");
}

struct Options {
    store: PathBuf,
    config: Option<PathBuf>,
    seed: Option<u64>,
    file: Option<String>,
}

fn parse_args(args: &[String]) -> Options {
    let mut options = Options {
        store: PathBuf::from(".wall-picker"),
        config: None,
        seed: None,
        file: None,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--store" | "--config" | "--seed" => {
                let value = iter.next().unwrap_or_else(|| {
                    eprintln!("Missing value for {}", arg);
                    process::exit(1);
                });
                match arg.as_str() {
                    "--store" => options.store = PathBuf::from(value),
                    "--config" => options.config = Some(PathBuf::from(value)),
                    _ => {
                        let seed = value.parse::<u64>().unwrap_or_else(|e| {
                            eprintln!("Error parsing seed '{}': {}", value, e);
                            process::exit(1);
                        });
                        options.seed = Some(seed);
                    }
                }
            }
            _ if options.file.is_none() => options.file = Some(arg.clone()),
            _ => {
                print_usage();
                process::exit(1);
            }
        }
    }
    options
}

/// Draws the wall as a text grid and the pick animation on one line
#[derive(Default)]
struct TerminalRenderer {
    items: Vec<String>,
    columns: usize,
}

impl TerminalRenderer {
    fn print_wall(&self) {
        if self.items.is_empty() {
            println!("(the wall is empty)");
            return;
        }
        let width = self.items.iter().map(|i| i.chars().count()).max().unwrap_or(0);
        for row in self.items.chunks(self.columns.max(1)) {
            let cells: Vec<String> = row.iter().map(|i| format!("[{:^width$}]", i)).collect();
            println!("{}", cells.join(" "));
        }
    }
}

impl WallRenderer for TerminalRenderer {
    fn render(&mut self, event: &WallEvent) {
        match event {
            WallEvent::Rendered { items, columns } => {
                self.items = items.clone();
                self.columns = *columns;
                self.print_wall();
            }
            WallEvent::Cleared => {
                self.items.clear();
                self.columns = 0;
            }
            WallEvent::SelectionCleared => {}
            WallEvent::Highlight { index, .. } => {
                let item = self.items.get(*index).map(String::as_str).unwrap_or("");
                print!("\r\x1b[2K  > {}", item);
                let _ = std::io::stdout().flush();
            }
            WallEvent::Unhighlight { .. } => {}
            WallEvent::Selected { .. } => {
                print!("\r\x1b[2K");
                let _ = std::io::stdout().flush();
            }
        }
    }
}

struct Session {
    picker: WallPicker,
    renderer: TerminalRenderer,
    store: FolderStore,
    timer: TokioTimer,
}

impl Session {
    fn report_generated(&self, source_name: &str, result: &Result<Generated, PickerError>) {
        if let Ok(generated) = result {
            eprint!(
                "{}",
                diagnostic::report_all(source_name, self.picker.input(), &generated.malformed)
            );
        }
    }

    fn print_feedback(&mut self) {
        if let Some(status) = self.picker.status() {
            println!("{}", status);
        }
        if let Some(notice) = self.picker.notice(self.timer.now()) {
            println!("* {}", notice.message);
            let id = notice.id;
            // Terminal notices are printed once; drop them so they are not repeated
            self.picker.dismiss_notice(id);
        }
    }

    async fn run_command(&mut self, line: &str, lines: &mut StdinLines) -> bool {
        let mut parts = line.trim().splitn(2, ' ');
        let command = parts.next().unwrap_or("");
        let argument = parts.next().map(str::trim).filter(|a| !a.is_empty());

        match command {
            "" => return true,
            "help" => print_commands(),
            "quit" | "exit" => return false,
            "show" => self.renderer.print_wall(),
            "enter" => {
                let mut text = String::new();
                while let Ok(Some(entry)) = lines.next_line().await {
                    if entry.trim() == "." {
                        break;
                    }
                    text.push_str(&entry);
                    text.push('\n');
                }
                let result = self.picker.generate(&text, &mut self.renderer);
                self.report_generated("input", &result);
            }
            "generate" => {
                let result = self.picker.regenerate(&mut self.renderer);
                self.report_generated("input", &result);
            }
            "pick" => {
                if let Err(e) = self.picker.pick(&mut self.renderer, &self.timer).await {
                    tracing::debug!(error = %e, "pick refused");
                }
            }
            "remove" => match self.picker.remove_selected(&mut self.renderer) {
                Ok(removal) => println!("Removed: {}", removal.item),
                Err(e) => println!("{}", e.message()),
            },
            "save" => {
                let _ = self.picker.save(&self.store, &self.timer).await;
            }
            "load" => {
                let result = self
                    .picker
                    .load(&self.store, &mut self.renderer, &self.timer)
                    .await;
                self.report_generated("saved list", &result);
            }
            "export" => {
                let file = self.picker.export();
                let path = argument
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(&file.file_name));
                match tokio::fs::write(&path, &file.contents).await {
                    Ok(()) => println!(
                        "Exported {} items to {}",
                        self.picker.items().len(),
                        path.display()
                    ),
                    Err(e) => eprintln!("Error writing '{}': {}", path.display(), e),
                }
            }
            "import" => match argument {
                Some(path) => match tokio::fs::read_to_string(path).await {
                    Ok(text) => {
                        let result = self.picker.import(&text, &mut self.renderer);
                        self.report_generated(path, &result);
                    }
                    Err(e) => eprintln!("Error reading file '{}': {}", path, e),
                },
                None => println!("Usage: import <path>"),
            },
            other => println!("Unknown command '{}', try 'help'", other),
        }

        self.print_feedback();
        true
    }
}

fn load_config(path: Option<&PathBuf>) -> PickerConfig {
    let Some(path) = path else {
        return PickerConfig::default();
    };
    let json = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config '{}': {}", path.display(), e);
        process::exit(1);
    });
    PickerConfig::from_json(&json).unwrap_or_else(|e| {
        eprintln!("Error parsing config '{}': {}", path.display(), e);
        process::exit(1);
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args);
    let config = load_config(options.config.as_ref());

    let picker = match options.seed {
        Some(seed) => WallPicker::with_seed(config, seed),
        None => WallPicker::new(config),
    };
    let mut session = Session {
        picker,
        renderer: TerminalRenderer::default(),
        store: FolderStore::new(options.store),
        timer: TokioTimer::new(),
    };

    // One-shot mode: list on stdin, print the winner
    if options.file.as_deref() == Some("-") {
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .unwrap_or_else(|e| {
                eprintln!("Error reading from stdin: {}", e);
                process::exit(1);
            });
        let result = session.picker.generate(&buffer, &mut |_: &WallEvent| {});
        session.report_generated("<stdin>", &result);
        if let Err(e) = result {
            eprintln!("{}", e.message());
            process::exit(1);
        }
        match session.picker.pick(&mut |_: &WallEvent| {}, &session.timer).await {
            Ok(selection) => println!("{}", selection.item),
            Err(e) => {
                eprintln!("{}", e.message());
                process::exit(1);
            }
        }
        return;
    }

    match options.file.as_deref() {
        Some(path) => {
            let text = tokio::fs::read_to_string(path).await.unwrap_or_else(|e| {
                eprintln!("Error reading file '{}': {}", path, e);
                process::exit(1);
            });
            let result = session.picker.import(&text, &mut session.renderer);
            session.report_generated(path, &result);
        }
        None => {
            let result = session
                .picker
                .load(&session.store, &mut session.renderer, &session.timer)
                .await;
            session.report_generated("saved list", &result);
        }
    }
    session.print_feedback();
    print_commands();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error reading from stdin: {}", e);
                process::exit(1);
            }
        };
        if !session.run_command(&line, &mut lines).await {
            break;
        }
    }
}
