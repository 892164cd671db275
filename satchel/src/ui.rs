use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub struct InputPrompt<'a> {
    pub title: &'a str,
    pub hint: &'a str,
    pub prefill: Option<&'a str>,
}

/// The modal surface the manager talks to. Implementations decide how a
/// confirm/error/progress dialog actually looks; flows only sequence them.
#[async_trait]
pub trait DialogSurface: Send + Sync {
    /// Yes/no question; resolves once the user answers.
    async fn confirm(&self, title: &str, message: &str) -> bool;

    /// Blocking modal notice for a failed operation.
    async fn error(&self, message: &str);

    /// Non-blocking notice.
    async fn notify(&self, message: &str);

    /// Single-line text input. `None` means the prompt was dismissed.
    async fn input(&self, prompt: InputPrompt<'_>) -> Option<String>;

    /// Choose one of `options`; `None` means the prompt was dismissed.
    async fn pick(&self, title: &str, options: &[&str]) -> Option<usize>;

    /// Show an indeterminate progress indicator. When `cancel` is given the
    /// indicator offers a cancel affordance that trips the token.
    fn progress(
        &self,
        message: &str,
        cancel: Option<CancellationToken>,
    ) -> Box<dyn ProgressIndicator>;
}

pub trait ProgressIndicator: Send {
    fn dismiss(self: Box<Self>);
}

/// Line-oriented surface for the command-line binary.
pub struct ConsoleDialogs;

#[async_trait]
impl DialogSurface for ConsoleDialogs {
    async fn confirm(&self, title: &str, message: &str) -> bool {
        println!("{title}: {message} [y/N]");
        matches!(
            read_line().await.as_deref().map(str::trim),
            Some("y" | "Y" | "yes")
        )
    }

    async fn error(&self, message: &str) {
        eprintln!("[satchel] error: {message}");
    }

    async fn notify(&self, message: &str) {
        println!("[satchel] {message}");
    }

    async fn input(&self, prompt: InputPrompt<'_>) -> Option<String> {
        match prompt.prefill {
            Some(prefill) => println!("{} ({}) [{prefill}]:", prompt.title, prompt.hint),
            None => println!("{} ({}):", prompt.title, prompt.hint),
        }
        let line = read_line().await?;
        let line = line.trim();
        if line.is_empty() {
            prompt.prefill.map(str::to_string)
        } else {
            Some(line.to_string())
        }
    }

    async fn pick(&self, title: &str, options: &[&str]) -> Option<usize> {
        println!("{title}:");
        for (index, option) in options.iter().enumerate() {
            println!("  {}) {option}", index + 1);
        }
        let line = read_line().await?;
        let choice = line.trim().parse::<usize>().ok()?;
        (1..=options.len()).contains(&choice).then(|| choice - 1)
    }

    fn progress(
        &self,
        message: &str,
        _cancel: Option<CancellationToken>,
    ) -> Box<dyn ProgressIndicator> {
        // No cancel affordance on a plain terminal; ^C aborts the whole run.
        println!("[satchel] {message}…");
        Box::new(ConsoleProgress)
    }
}

struct ConsoleProgress;

impl ProgressIndicator for ConsoleProgress {
    fn dismiss(self: Box<Self>) {}
}

async fn read_line() -> Option<String> {
    tokio::task::spawn_blocking(read_line_blocking)
        .await
        .ok()
        .flatten()
}

fn read_line_blocking() -> Option<String> {
    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}
