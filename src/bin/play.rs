use anyhow::{Context, Result};
use gridbot_core::{
    Action, FixedDelayPacer, GameConfig, InstantPacer, JsonFileStore, LevelCatalog, LevelId,
    Renderer, Session, SessionEvent, StepPacer, TextRenderer,
};

fn main() -> Result<()> {
    init_tracing();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let fast = if let Some(pos) = args.iter().position(|arg| arg == "--fast") {
        args.remove(pos);
        true
    } else {
        false
    };

    let board_path = args
        .first()
        .cloned()
        .unwrap_or_else(|| "board.json".to_string());
    let command_path = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "config.json".to_string());
    let store_path = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| "gridbot-session.json".to_string());

    let config = GameConfig::from_paths(&board_path, &command_path)
        .with_context(|| format!("loading {board_path} and {command_path}"))?;
    let mut session = Session::new(config, Box::new(JsonFileStore::new(store_path)));

    let mut pacer: Box<dyn StepPacer> = if fast {
        Box::new(InstantPacer)
    } else {
        Box::new(FixedDelayPacer::default())
    };

    println!("GridBot headless REPL");
    print_help();
    print_view(&session);

    let mut line = String::new();
    loop {
        line.clear();
        if std::io::stdin().read_line(&mut line).is_err() {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            print_view(&session);
            continue;
        }
        if trimmed == "q" || trimmed == "quit" {
            break;
        }
        if trimmed == "help" {
            print_help();
            continue;
        }
        if trimmed == "state" {
            print_view(&session);
            continue;
        }
        if trimmed == "levels" {
            for season in LevelCatalog::seasons() {
                for program in LevelCatalog::programs(season) {
                    println!("  {}", LevelId::compose(season, program));
                }
            }
            continue;
        }

        match parse_action(trimmed) {
            // Mirror the selection surface: locked commands never reach
            // the buffer.
            Some(Action::AppendCommand(id))
                if !session.state().usable_commands.iter().any(|c| *c == id) =>
            {
                println!("locked: {id}");
            }
            Some(action) => {
                let redraw = matches!(action, Action::Run | Action::Step);
                match session.dispatch(action, pacer.as_mut()) {
                    Ok(events) => {
                        for event in &events {
                            print_event(event);
                        }
                        if redraw {
                            print_view(&session);
                        }
                    }
                    Err(err) => println!("rejected: {err}"),
                }
            }
            None => println!("Unknown input: {trimmed} (try `help`)"),
        }
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn print_help() {
    println!("Inputs:");
    println!("  level <id>       select a level (see `levels`)");
    println!("  add <command>    append a usable command to the program");
    println!("  pop              remove the last command");
    println!("  clear            empty the program");
    println!("  run | step       execute the program / a single command");
    println!("  score <n>        set the score");
    println!("  population <n>   set the population size");
    println!("  reset            discard progress for this level");
    println!("  state, levels, help, q");
}

fn parse_action(input: &str) -> Option<Action> {
    let mut parts = input.split_whitespace();
    match parts.next()? {
        "run" => Some(Action::Run),
        "step" => Some(Action::Step),
        "pop" => Some(Action::RemoveLastCommand),
        "clear" => Some(Action::ClearProgram),
        "reset" => Some(Action::Reset),
        "level" => parts.next().map(|id| Action::SelectLevel(LevelId::new(id))),
        "score" => parts.next()?.parse().ok().map(Action::SetScore),
        "population" => parts.next()?.parse().ok().map(Action::SetPopulation),
        "add" => parts.next().map(|id| Action::AppendCommand(id.to_string())),
        _ => None,
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Moved { to, .. } => println!("moved to ({}, {})", to.x, to.y),
        SessionEvent::Jumped { to, .. } => println!("jumped to ({}, {})", to.x, to.y),
        SessionEvent::HeroAcquired { hero_id } => println!(">>> {hero_id} joined the team <<<"),
        SessionEvent::PlanetActivated { planet_id } => println!("planet {planet_id} lit up"),
        SessionEvent::StorageOpened => println!("storage opened - the container can be opened"),
        SessionEvent::TeleportEngaged => println!("teleport engaged"),
        SessionEvent::ContainerOpened { message } => println!(">>> {message} <<<"),
    }
}

fn print_view(session: &Session) {
    let output = TextRenderer::new()
        .render(&session.view())
        .expect("text rendering is infallible");
    println!("\n{output}");
}
