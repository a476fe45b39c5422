use clap::Parser;
use miette::Result;
use pft::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Terminate silently on a closed pipe (`pft list | head`)
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    pft::cli::logging::init(&global);

    match cli.command {
        Commands::Init(args) => pft::cli::commands::init::run(args),
        Commands::Create(args) => pft::cli::commands::create::run(args, &global),
        Commands::Next(args) => pft::cli::commands::next::run(args, &global),
        Commands::List(args) => pft::cli::commands::list::run(args, &global),
        Commands::Show(args) => pft::cli::commands::show::run(args, &global),
        Commands::Update(args) => pft::cli::commands::update::run(args, &global),
        Commands::Config(cmd) => pft::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => pft::cli::commands::completions::run(args),
    }
}
