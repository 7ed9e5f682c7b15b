use pipecmd::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=pipecmd=debug shows every spawn
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let sorted = sh("printf").arg("pear\napple\nfig\n") | sh("sort");
    println!("$ {}", sorted);
    print!("{}", sorted.output_string()?);

    let fallback = sh("false") ^ sh("echo").arg("fell back");
    println!("$ {}", fallback);
    fallback.call()?;

    let dir = std::env::temp_dir().join(format!("pipecmd-demo-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let log = dir.join("log.txt");

    let note = sh("echo").arg("entry");
    (note.clone() >> &log).call()?;
    (note >> &log).call()?;
    let lines = (log.as_path() >> sh("wc").arg("-l")) | runner::run().from_str(|s| s.trim().parse::<usize>());
    println!("{} has {} lines", log.display(), lines??);

    for line in (sh("ls").arg("-1") | sh("head").args(["-n", "3"])).lines()? {
        print!("  {}", line?);
    }

    match checked("sh").args(["-c", "exit 4"]).call() {
        Err(e) => println!("{} (code {:?})", e, e.exit_code()),
        Ok(p) => println!("unexpected success: {:?}", p.returncode()),
    }

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
