//! Colored console rendering for check narration.
//!
//! Finding categories print red when populated and green when `"None"`;
//! adviser notes print blue. Colors are only applied on a TTY.

use colored::Colorize;

use advisor::report::NO_FINDINGS;

/// Console narration with TTY-aware coloring.
pub struct Console {
    quiet: bool,
    is_tty: bool,
}

impl Console {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            is_tty: atty::is(atty::Stream::Stdout),
        }
    }

    /// Plain narration line.
    pub fn line(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    /// Empty narration line.
    pub fn blank(&self) {
        self.line("");
    }

    /// Separator between students in a batch.
    pub fn separator(&self) {
        self.line("");
        self.line(&"-".repeat(60));
        self.line("");
    }

    /// A finding category value: red when populated, green when clean.
    pub fn category(&self, value: &str) {
        if self.quiet {
            return;
        }
        if !self.is_tty {
            println!("{}", value);
        } else if value == NO_FINDINGS {
            println!("{}", value.green());
        } else {
            println!("{}", value.red());
        }
        println!();
    }

    /// Adviser recommendations: blue rather than red, they block nothing.
    pub fn advice(&self, value: &str) {
        if self.quiet {
            return;
        }
        if !self.is_tty {
            println!("{}", value);
        } else if value == NO_FINDINGS {
            println!("{}", value.green());
        } else {
            println!("{}", value.blue());
        }
        println!();
    }

    /// A per-file warning; printed even when a later sentinel row will
    /// carry the same message.
    pub fn warn(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.is_tty {
            println!("{}", message.red());
        } else {
            println!("{}", message);
        }
    }
}
