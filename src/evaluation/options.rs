//! Options of the throwaway compilation an evaluation runs in.
//!
//! The defaults describe a library that may use unsafe code, targets any CPU, is optimized,
//! and imports *all* metadata members including private ones, which the state-machine origin
//! resolver needs to see compiler-generated nested types.

use strum::{Display, EnumString};

/// Kind of binary the compilation would produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
pub enum OutputKind {
    /// A `.dll`
    #[default]
    DynamicallyLinkedLibrary,
    /// A console `.exe`
    ConsoleApplication,
    /// A GUI `.exe`
    WindowsApplication,
    /// A `.netmodule`
    NetModule,
}

/// Target platform of the compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
pub enum Platform {
    /// Any CPU
    #[default]
    AnyCpu,
    /// Any CPU, preferring 32 bit where available
    AnyCpu32BitPreferred,
    /// 32-bit x86
    X86,
    /// 64-bit x86
    X64,
    /// 64-bit ARM
    Arm64,
}

/// Optimization level of the compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
pub enum OptimizationLevel {
    /// No optimizations, full debug information
    Debug,
    /// Optimized code
    #[default]
    Release,
}

/// Which metadata members are visible to the compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
pub enum MetadataImportOptions {
    /// Public and protected members only
    Public,
    /// Also internal members
    Internal,
    /// Every member, including private ones and compiler-generated types
    #[default]
    All,
}

/// Options of an [`crate::evaluation::EvaluationContext`].
///
/// # Examples
///
/// ```rust
/// use evalscope::evaluation::options::{CompilationOptions, MetadataImportOptions, Platform};
///
/// let options = CompilationOptions::default()
///     .with_platform(Platform::X64)
///     .with_import_options(MetadataImportOptions::Internal);
///
/// assert!(options.allow_unsafe);
/// assert_eq!(options.platform.to_string(), "X64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompilationOptions {
    /// Kind of binary the compilation would produce
    pub output_kind: OutputKind,
    /// Whether unsafe code is allowed
    pub allow_unsafe: bool,
    /// Target platform
    pub platform: Platform,
    /// Optimization level
    pub optimization_level: OptimizationLevel,
    /// Member visibility for imported metadata
    pub import_options: MetadataImportOptions,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        CompilationOptions {
            output_kind: OutputKind::DynamicallyLinkedLibrary,
            allow_unsafe: true,
            platform: Platform::AnyCpu,
            optimization_level: OptimizationLevel::Release,
            import_options: MetadataImportOptions::All,
        }
    }
}

impl CompilationOptions {
    /// Sets the output kind
    #[must_use]
    pub fn with_output_kind(mut self, output_kind: OutputKind) -> Self {
        self.output_kind = output_kind;
        self
    }

    /// Allows or forbids unsafe code
    #[must_use]
    pub fn with_allow_unsafe(mut self, allow_unsafe: bool) -> Self {
        self.allow_unsafe = allow_unsafe;
        self
    }

    /// Sets the target platform
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Sets the optimization level
    #[must_use]
    pub fn with_optimization_level(mut self, optimization_level: OptimizationLevel) -> Self {
        self.optimization_level = optimization_level;
        self
    }

    /// Sets which metadata members are imported
    #[must_use]
    pub fn with_import_options(mut self, import_options: MetadataImportOptions) -> Self {
        self.import_options = import_options;
        self
    }
}
