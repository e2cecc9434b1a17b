/// Whether the network is simplified locally before saturation, unless stated otherwise
const DEFAULT_PREOPTIMIZE: bool = true;
/// Whether the saturation runs, unless stated otherwise
const DEFAULT_REWRITE: bool = true;

/// Settings of a compilation or rewriting run
///
/// The field order is part of the engine boundary and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct CompilerSettings {
    /// Print the compiled program to stdout (compile mode only)
    pub print_program: bool,
    /// Report saturation and timings at info level
    pub verbose: bool,
    /// Run the preoptimization pass on the input network first
    pub preoptimize: bool,
    /// Saturate the e-graph; when false, the network is extracted as it was received
    pub rewrite: bool,
}

/// Engine-facing view of [`CompilerSettings`], without the preoptimization flag
///
/// Preoptimization is applied before the network crosses into the engine, so the engine
/// never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct CompilerSettingsReduced {
    /// Print the compiled program to stdout (compile mode only)
    pub print_program: bool,
    /// Report saturation and timings at info level
    pub verbose: bool,
    /// Saturate the e-graph; when false, the network is extracted as it was received
    pub rewrite: bool,
}

impl CompilerSettings {
    /// Settings with the given reporting options, preoptimization and rewriting enabled
    pub fn new(print_program: bool, verbose: bool) -> Self {
        CompilerSettings {
            print_program,
            verbose,
            preoptimize: DEFAULT_PREOPTIMIZE,
            rewrite: DEFAULT_REWRITE,
        }
    }

    /// Enable or disable the preoptimization pass
    pub fn with_preoptimize(self, preoptimize: bool) -> Self {
        CompilerSettings {
            preoptimize,
            ..self
        }
    }

    /// Enable or disable the saturation
    pub fn with_rewrite(self, rewrite: bool) -> Self {
        CompilerSettings { rewrite, ..self }
    }

    /// Project the settings on the engine-facing view
    pub fn reduced(&self) -> CompilerSettingsReduced {
        CompilerSettingsReduced::from(*self)
    }
}

impl Default for CompilerSettings {
    fn default() -> Self {
        CompilerSettings::new(false, false)
    }
}

impl From<CompilerSettings> for CompilerSettingsReduced {
    fn from(s: CompilerSettings) -> Self {
        CompilerSettingsReduced {
            print_program: s.print_program,
            verbose: s.verbose,
            rewrite: s.rewrite,
        }
    }
}

impl Default for CompilerSettingsReduced {
    fn default() -> Self {
        CompilerSettings::default().reduced()
    }
}

#[cfg(test)]
mod tests {
    use super::{CompilerSettings, CompilerSettingsReduced};

    #[test]
    fn test_defaults() {
        for (print_program, verbose) in [
            (false, false),
            (true, false),
            (false, true),
            (true, true),
        ] {
            let s = CompilerSettings::new(print_program, verbose);
            assert_eq!(s.print_program, print_program);
            assert_eq!(s.verbose, verbose);
            assert!(s.preoptimize);
            assert!(s.rewrite);
        }
        assert_eq!(CompilerSettings::default(), CompilerSettings::new(false, false));
    }

    #[test]
    fn test_reduced() {
        for bits in 0..16u8 {
            let s = CompilerSettings {
                print_program: bits & 1 != 0,
                verbose: bits & 2 != 0,
                preoptimize: bits & 4 != 0,
                rewrite: bits & 8 != 0,
            };
            let r = s.reduced();
            assert_eq!(r.print_program, s.print_program);
            assert_eq!(r.verbose, s.verbose);
            assert_eq!(r.rewrite, s.rewrite);
            assert_eq!(r, CompilerSettingsReduced::from(s));
        }
        assert!(CompilerSettingsReduced::default().rewrite);
    }

    #[test]
    fn test_builders() {
        let s = CompilerSettings::new(true, false)
            .with_preoptimize(false)
            .with_rewrite(false);
        assert!(s.print_program);
        assert!(!s.preoptimize);
        assert!(!s.rewrite);
    }

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<CompilerSettings>(), 4);
        assert_eq!(std::mem::size_of::<CompilerSettingsReduced>(), 3);
    }
}
