use std::{
    fmt,
    io::{self, BufRead, Write},
    str::FromStr,
};

use config::SharedStore;
use movemycam_engine::{Engine, EngineState, Notifier};

/// Prints notifications to stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, title: &str) {
        println!("[{title}] {message}");
    }
}

/// A console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Activate,
    Deactivate,
    Reload,
    Status,
    Help,
    Quit,
}

/// Unrecognized command text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command `{}` (try `help`)", self.0)
    }
}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "activate" | "start" | "on" => Ok(Self::Activate),
            "deactivate" | "stop" | "off" => Ok(Self::Deactivate),
            "reload" => Ok(Self::Reload),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

const HELP: &str = "\
commands:
  activate    start listening for hotkeys
  deactivate  stop listening
  reload      re-read the configuration file
  status      show listener state and cameras
  quit        exit";

/// Stand-in for the tray menu: reads commands from `input`, answers on `out`.
pub struct Console<'a, R, W> {
    engine: &'a Engine,
    store: SharedStore,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    pub fn new(engine: &'a Engine, store: SharedStore, input: R, out: W) -> Self {
        Self {
            engine,
            store,
            input,
            out,
        }
    }

    /// Serve commands until `quit` or end of input. The engine is stopped on return.
    pub fn run(&mut self) -> io::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(cmd) => self.execute(cmd)?,
                Err(e) => writeln!(self.out, "{e}")?,
            }
        }
        self.engine.stop();
        Ok(())
    }

    fn execute(&mut self, cmd: Command) -> io::Result<()> {
        match cmd {
            Command::Activate => self.activate(),
            Command::Deactivate => {
                self.engine.stop();
                writeln!(self.out, "hotkeys off")
            }
            Command::Reload => {
                if self.engine.load_configuration() {
                    writeln!(self.out, "configuration reloaded")
                } else {
                    writeln!(self.out, "configuration rejected, previous bindings kept")
                }
            }
            Command::Status => self.status(),
            Command::Help => writeln!(self.out, "{HELP}"),
            Command::Quit => Ok(()),
        }
    }

    pub fn activate(&mut self) -> io::Result<()> {
        match self.engine.start() {
            Ok(true) => writeln!(self.out, "hotkeys on"),
            Ok(false) => {
                let path = self.store.lock().path().display().to_string();
                writeln!(
                    self.out,
                    "no active camera with hot keys; edit {path} and `reload`"
                )
            }
            Err(e) => writeln!(self.out, "hotkeys not started: {e}"),
        }
    }

    fn status(&mut self) -> io::Result<()> {
        let state = match self.engine.state() {
            EngineState::Running => "on",
            EngineState::Stopped => "off",
            EngineState::Starting => "starting",
            EngineState::Stopping => "stopping",
        };
        let lines: Vec<String> = {
            let store = self.store.lock();
            store
                .cameras()
                .iter()
                .map(|c| {
                    format!(
                        "  №{} {} {}:{} preset {} [{}]",
                        c.number,
                        if c.activated { "on " } else { "off" },
                        c.address,
                        c.port,
                        c.preset,
                        c.hot_keys.join(" + ")
                    )
                })
                .collect()
        };
        writeln!(self.out, "hotkeys {state}, {} camera(s)", lines.len())?;
        for l in lines {
            writeln!(self.out, "{l}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{env, io::Cursor, process, sync::Arc};

    use camera::mock::{CameraScript, MockDeviceApi};
    use config::{CameraBinding, ConfigStore};
    use movemycam_engine::{DispatchMode, EngineOptions, test_support::ManualHook};

    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("  Activate \n".parse::<Command>(), Ok(Command::Activate));
        assert_eq!("off".parse::<Command>(), Ok(Command::Deactivate));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
        assert!("fly".parse::<Command>().is_err());
    }

    fn engine_with_camera() -> (Engine, SharedStore, ManualHook, MockDeviceApi) {
        let path = env::temp_dir().join(format!(
            "movemycam-console-{}-never-written.conf",
            process::id()
        ));
        let mut store = ConfigStore::new(path).unwrap();
        store
            .insert_camera(
                CameraBinding {
                    number: 4,
                    activated: true,
                    hot_keys: vec!["F4".into()],
                    address: "10.0.0.4".into(),
                    port: 8080,
                    username: String::new(),
                    password: String::new(),
                    max_count: 3,
                    preset: 2,
                },
                false,
            )
            .unwrap();
        let store = store.shared();
        let hook = ManualHook::new();
        let api = MockDeviceApi::new();
        api.script("10.0.0.4", CameraScript::healthy(3));
        let engine = Engine::new(
            store.clone(),
            Arc::new(hook.clone()),
            Arc::new(api.clone()),
            EngineOptions {
                dispatch: DispatchMode::Inline,
            },
        )
        .unwrap();
        (engine, store, hook, api)
    }

    #[test]
    fn activate_status_and_quit() {
        let (engine, store, hook, api) = engine_with_camera();
        let mut out = Vec::new();
        {
            let input = Cursor::new("activate\nstatus\nbogus\n");
            let mut console = Console::new(&engine, store, input, &mut out);
            console.run().unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("hotkeys on"));
        assert!(text.contains("№4 on  10.0.0.4:8080 preset 2 [F4]"));
        assert!(text.contains("unknown command `bogus`"));
        assert_eq!(engine.state(), EngineState::Stopped);

        hook.chord(&["F4"]);
        assert!(api.goto_calls().is_empty());
    }

    #[test]
    fn hotkeys_work_while_console_is_active() {
        let (engine, store, hook, api) = engine_with_camera();
        let mut out = Vec::new();
        let mut console = Console::new(&engine, store, Cursor::new(""), &mut out);
        console.activate().unwrap();
        hook.chord(&["F4"]);
        assert_eq!(api.goto_calls().len(), 1);
        assert_eq!(api.goto_calls()[0].preset, 2);
    }
}
