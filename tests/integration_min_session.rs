// Minimal integration test that drives the compiled binary through a PTY.
// This exercises the real event loop and crossterm input handling across
// the main boundaries without relying on internal modules.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Marked Unix-only and ignored by default to avoid CI/platform issues.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn play_pause_and_quit() -> Result<(), Box<dyn std::error::Error>> {
    // Resolve path to compiled binary (debug build during tests)
    let bin = assert_cmd::cargo::cargo_bin("squarebrick");
    let cmd = format!("{} --play --ephemeral --speed newbie", bin.display());

    let mut p = spawn(cmd)?;

    // Give the app a moment to initialize the terminal/alternate screen
    std::thread::sleep(Duration::from_millis(300));

    // A wrong answer, then pause and resume
    p.send("1\r")?;
    p.send(" ")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send(" ")?;
    std::thread::sleep(Duration::from_millis(100));

    // ESC leaves the game for the menu, q quits from the menu
    p.send("\x1b")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("q")?;

    p.expect(Eof)?;
    Ok(())
}

#[test]
#[ignore]
fn menu_quits_immediately() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("squarebrick");
    let mut p = spawn(format!("{} --ephemeral", bin.display()))?;

    std::thread::sleep(Duration::from_millis(300));
    p.send("q")?;

    p.expect(Eof)?;
    Ok(())
}
