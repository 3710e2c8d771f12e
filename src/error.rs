#[derive(Debug, snafu::Snafu)]
#[snafu(visibility = "pub")]
pub enum Error {
    #[snafu(display("vote already submitted"))]
    AlreadyVoted,

    #[snafu(display("config file {} doesn't exist", name))]
    ConfigFileDoesntExist { name: String },

    #[snafu(display("failed to parse config file: {}", source))]
    CouldntParseConfig { source: config::ConfigError },

    #[snafu(display("failed to create http client: {}", source))]
    CreateHttpClient { source: reqwest::Error },

    #[snafu(display("server sent an empty client identifier"))]
    EmptyIdentity,

    #[snafu(display("failed to flush terminal: {}", source))]
    FlushTerminal { source: std::io::Error },

    #[snafu(display("failed to get terminal size: {}", source))]
    GetTerminalSize { source: crossterm::ErrorKind },

    #[snafu(display("no client ID assigned yet, try again in a moment"))]
    IdentityMissing,

    #[snafu(display("couldn't find name in argv"))]
    MissingArgv,

    #[snafu(display("select a candidate before voting"))]
    NoCandidateSelected,

    #[snafu(display(
        "detected argv path was not a valid filename: {}",
        path
    ))]
    NotAFileName { path: String },

    #[snafu(display("failed to parse command line arguments: {}", source))]
    ParseArgs { source: clap::Error },

    #[snafu(display("failed to parse config file: {}", source))]
    ParseConfigFile { source: config::ConfigError },

    #[snafu(display("failed to parse {} '{}': {}", name, input, source))]
    ParseInterval {
        name: &'static str,
        input: String,
        source: std::num::ParseIntError,
    },

    #[snafu(display("failed to parse json from {}: {}", endpoint, source))]
    ParseJson {
        endpoint: &'static str,
        source: serde_json::Error,
    },

    #[snafu(display("failed to parse seconds remaining '{}': {}", input, source))]
    ParseSecondsRemaining {
        input: String,
        source: std::num::ParseIntError,
    },

    #[snafu(display("failed to parse server address '{}': {}", input, source))]
    ParseServerAddress {
        input: String,
        source: url::ParseError,
    },

    #[snafu(display("unrecognized status '{}'", status))]
    ParseStatus { status: String },

    #[snafu(display("failed to read channel: {}", source))]
    ReadChannel {
        source: tokio::sync::mpsc::error::UnboundedRecvError,
    },

    #[snafu(display("failed to read response body from {}: {}", endpoint, source))]
    ReadResponse {
        endpoint: &'static str,
        source: reqwest::Error,
    },

    #[snafu(display("request to {} failed: {}", endpoint, source))]
    Request {
        endpoint: &'static str,
        source: reqwest::Error,
    },

    #[snafu(display("failed to register SIGWINCH handler: {}", source))]
    SigWinchHandler { source: std::io::Error },

    #[snafu(display(
        "failed to spawn a background thread to read terminal input: {}",
        source
    ))]
    TerminalInputReadingThread { source: std::io::Error },

    #[snafu(display("timer failed: {}", source))]
    Timer { source: tokio::timer::Error },

    #[snafu(display("failed to put the terminal into raw mode: {}", source))]
    ToRawMode { source: crossterm::ErrorKind },

    #[snafu(display("server address {} can't be used as a base url", url))]
    UrlCannotBeABase { url: url::Url },

    #[snafu(display("voting has ended"))]
    VotingClosed,

    #[snafu(display("failed to write to terminal: {}", source))]
    WriteTerminal { source: std::io::Error },

    #[snafu(display("{} must be greater than zero", name))]
    ZeroInterval { name: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
