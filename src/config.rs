use crate::prelude::*;
use serde::de::Deserialize as _;

const CONFIG_FILENAME: &str = "config.toml";

const CANDIDATES_OPTION: &str = "candidates";
const COUNTDOWN_INTERVAL_OPTION: &str = "countdown-interval-secs";
const SERVER_ADDRESS_OPTION: &str = "server-address";
const STATS_INTERVAL_OPTION: &str = "stats-interval-secs";
const STATUS_INTERVAL_OPTION: &str = "status-interval-secs";

const DEFAULT_SERVER_ADDRESS: &str = "http://127.0.0.1:8080/";
const DEFAULT_STATUS_INTERVAL: std::time::Duration =
    std::time::Duration::from_secs(3);
const DEFAULT_COUNTDOWN_INTERVAL: std::time::Duration =
    std::time::Duration::from_secs(1);
const DEFAULT_STATS_INTERVAL: std::time::Duration =
    std::time::Duration::from_secs(3);
const DEFAULT_CANDIDATES: &[&str] = &["Alice", "Bob", "Charlie"];

pub trait Config: std::fmt::Debug {
    fn merge_args<'a>(
        &mut self,
        matches: &clap::ArgMatches<'a>,
    ) -> Result<()>;
    fn run(
        &self,
    ) -> Box<dyn futures::Future<Item = (), Error = Error> + Send>;
}

pub fn config(
    filename: Option<&std::path::Path>,
) -> Result<Option<config::Config>> {
    let config_filename = if let Some(filename) = filename {
        if !filename.exists() {
            return Err(Error::ConfigFileDoesntExist {
                name: filename.to_string_lossy().to_string(),
            });
        }
        Some(filename.to_path_buf())
    } else {
        crate::dirs::Dirs::new()
            .and_then(|dirs| dirs.config_file(CONFIG_FILENAME))
    };
    config_filename
        .map(|config_filename| config_from_filename(&config_filename))
        .transpose()
}

fn config_from_filename(
    filename: &std::path::Path,
) -> Result<config::Config> {
    log::debug!("loading config from {}", filename.display());
    let mut config = config::Config::default();
    config
        .merge(config::File::from(filename))
        .context(crate::error::ParseConfigFile)?;
    Ok(config)
}

#[derive(serde::Deserialize, Debug)]
pub struct Client {
    #[serde(
        deserialize_with = "server_address",
        default = "default_server_address"
    )]
    pub server_address: url::Url,
}

impl Client {
    pub fn cmd<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
        let server_address_help =
            "Base URL of the voting server (defaults to http://127.0.0.1:8080/)";
        app.arg(
            clap::Arg::with_name(SERVER_ADDRESS_OPTION)
                .long(SERVER_ADDRESS_OPTION)
                .takes_value(true)
                .value_name("URL")
                .help(server_address_help),
        )
    }

    pub fn merge_args<'a>(
        &mut self,
        matches: &clap::ArgMatches<'a>,
    ) -> Result<()> {
        if let Some(address) = matches.value_of(SERVER_ADDRESS_OPTION) {
            self.server_address = to_server_address(address)?;
        }
        Ok(())
    }
}

impl Default for Client {
    fn default() -> Self {
        Self {
            server_address: default_server_address(),
        }
    }
}

fn server_address<'a, D>(
    deserializer: D,
) -> std::result::Result<url::Url, D::Error>
where
    D: serde::de::Deserializer<'a>,
{
    to_server_address(&<String>::deserialize(deserializer)?)
        .map_err(serde::de::Error::custom)
}

fn default_server_address() -> url::Url {
    // DEFAULT_SERVER_ADDRESS is a valid absolute url
    url::Url::parse(DEFAULT_SERVER_ADDRESS).unwrap()
}

pub fn to_server_address(address: &str) -> Result<url::Url> {
    let mut url = url::Url::parse(address)
        .context(crate::error::ParseServerAddress { input: address })?;
    if url.cannot_be_a_base() {
        return Err(Error::UrlCannotBeABase { url });
    }
    // endpoints are joined relative to the base, so "http://host/app" has to
    // mean "http://host/app/", not "http://host/"
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[derive(serde::Deserialize, Debug)]
pub struct Poll {
    #[serde(
        rename = "status_interval_secs",
        deserialize_with = "interval",
        default = "default_status_interval"
    )]
    pub status_interval: std::time::Duration,

    #[serde(
        rename = "countdown_interval_secs",
        deserialize_with = "interval",
        default = "default_countdown_interval"
    )]
    pub countdown_interval: std::time::Duration,

    #[serde(
        rename = "stats_interval_secs",
        deserialize_with = "interval",
        default = "default_stats_interval"
    )]
    pub stats_interval: std::time::Duration,
}

impl Poll {
    pub fn cmd<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
        let status_interval_help =
            "Seconds between checks of the voting phase (defaults to 3)";
        let countdown_interval_help =
            "Seconds between countdown updates after voting (defaults to 1)";
        let stats_interval_help =
            "Seconds between live tally updates after voting (defaults to 3)";
        app.arg(
            clap::Arg::with_name(STATUS_INTERVAL_OPTION)
                .long(STATUS_INTERVAL_OPTION)
                .takes_value(true)
                .value_name("SECS")
                .help(status_interval_help),
        )
        .arg(
            clap::Arg::with_name(COUNTDOWN_INTERVAL_OPTION)
                .long(COUNTDOWN_INTERVAL_OPTION)
                .takes_value(true)
                .value_name("SECS")
                .help(countdown_interval_help),
        )
        .arg(
            clap::Arg::with_name(STATS_INTERVAL_OPTION)
                .long(STATS_INTERVAL_OPTION)
                .takes_value(true)
                .value_name("SECS")
                .help(stats_interval_help),
        )
    }

    pub fn merge_args<'a>(
        &mut self,
        matches: &clap::ArgMatches<'a>,
    ) -> Result<()> {
        if let Some(s) = matches.value_of(STATUS_INTERVAL_OPTION) {
            self.status_interval =
                parse_interval(STATUS_INTERVAL_OPTION, s)?;
        }
        if let Some(s) = matches.value_of(COUNTDOWN_INTERVAL_OPTION) {
            self.countdown_interval =
                parse_interval(COUNTDOWN_INTERVAL_OPTION, s)?;
        }
        if let Some(s) = matches.value_of(STATS_INTERVAL_OPTION) {
            self.stats_interval = parse_interval(STATS_INTERVAL_OPTION, s)?;
        }
        Ok(())
    }

    pub fn intervals(&self) -> crate::session::Intervals {
        crate::session::Intervals {
            status: self.status_interval,
            countdown: self.countdown_interval,
            stats: self.stats_interval,
        }
    }
}

impl Default for Poll {
    fn default() -> Self {
        Self {
            status_interval: default_status_interval(),
            countdown_interval: default_countdown_interval(),
            stats_interval: default_stats_interval(),
        }
    }
}

fn parse_interval(
    name: &'static str,
    s: &str,
) -> Result<std::time::Duration> {
    let secs: u64 = s
        .parse()
        .context(crate::error::ParseInterval { name, input: s })?;
    if secs == 0 {
        return Err(Error::ZeroInterval { name });
    }
    Ok(std::time::Duration::from_secs(secs))
}

fn interval<'a, D>(
    deserializer: D,
) -> std::result::Result<std::time::Duration, D::Error>
where
    D: serde::de::Deserializer<'a>,
{
    let secs = u64::deserialize(deserializer)?;
    if secs == 0 {
        return Err(serde::de::Error::custom(
            "polling intervals must be greater than zero",
        ));
    }
    Ok(std::time::Duration::from_secs(secs))
}

fn default_status_interval() -> std::time::Duration {
    DEFAULT_STATUS_INTERVAL
}

fn default_countdown_interval() -> std::time::Duration {
    DEFAULT_COUNTDOWN_INTERVAL
}

fn default_stats_interval() -> std::time::Duration {
    DEFAULT_STATS_INTERVAL
}

#[derive(serde::Deserialize, Debug)]
pub struct Ballot {
    #[serde(deserialize_with = "candidates", default = "default_candidates")]
    pub candidates: Vec<String>,
}

impl Ballot {
    pub fn cmd<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
        let candidates_help = "Comma separated list of the candidates on the ballot (defaults to Alice,Bob,Charlie)";
        app.arg(
            clap::Arg::with_name(CANDIDATES_OPTION)
                .long(CANDIDATES_OPTION)
                .use_delimiter(true)
                .takes_value(true)
                .value_name("NAMES")
                .help(candidates_help),
        )
    }

    pub fn merge_args<'a>(
        &mut self,
        matches: &clap::ArgMatches<'a>,
    ) -> Result<()> {
        if let Some(names) = matches.values_of(CANDIDATES_OPTION) {
            self.candidates = to_candidates(names);
        }
        Ok(())
    }
}

impl Default for Ballot {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
        }
    }
}

fn to_candidates<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut candidates: Vec<String> = vec![];
    for name in names.map(str::trim).filter(|name| !name.is_empty()) {
        if !candidates.iter().any(|seen| seen == name) {
            candidates.push(name.to_string());
        }
    }
    candidates
}

fn candidates<'a, D>(
    deserializer: D,
) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::de::Deserializer<'a>,
{
    struct StringOrVec;

    impl<'a> serde::de::Visitor<'a> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(
            &self,
            formatter: &mut std::fmt::Formatter,
        ) -> std::fmt::Result {
            formatter.write_str("string or list")
        }

        fn visit_str<E>(
            self,
            value: &str,
        ) -> std::result::Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value
                .split(',')
                .map(std::string::ToString::to_string)
                .collect())
        }

        fn visit_seq<A>(
            self,
            seq: A,
        ) -> std::result::Result<Self::Value, A::Error>
        where
            A: serde::de::SeqAccess<'a>,
        {
            serde::de::Deserialize::deserialize(
                serde::de::value::SeqAccessDeserializer::new(seq),
            )
        }
    }

    let names = deserializer.deserialize_any(StringOrVec)?;
    Ok(to_candidates(names.iter().map(String::as_str)))
}

fn default_candidates() -> Vec<String> {
    DEFAULT_CANDIDATES
        .iter()
        .map(std::string::ToString::to_string)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn from_toml<T: serde::de::DeserializeOwned>(toml: &str) -> T {
        let mut config = config::Config::default();
        config
            .merge(config::File::from_str(toml, config::FileFormat::Toml))
            .unwrap();
        config.try_into().unwrap()
    }

    #[derive(serde::Deserialize, Debug)]
    struct Everything {
        #[serde(default)]
        client: Client,
        #[serde(default)]
        poll: Poll,
        #[serde(default)]
        ballot: Ballot,
    }

    #[test]
    fn test_defaults() {
        let config: Everything = from_toml("");
        assert_eq!(
            config.client.server_address.as_str(),
            "http://127.0.0.1:8080/"
        );
        assert_eq!(config.poll.intervals(), crate::session::Intervals::default());
        assert_eq!(config.ballot.candidates, vec!["Alice", "Bob", "Charlie"]);
    }

    #[test]
    fn test_from_file() {
        let config: Everything = from_toml(
            r#"
            [client]
            server_address = "http://vote.example.com:9000/live"

            [poll]
            status_interval_secs = 5
            countdown_interval_secs = 2

            [ballot]
            candidates = ["Kim", "Lee", "Kim"]
            "#,
        );
        assert_eq!(
            config.client.server_address.as_str(),
            "http://vote.example.com:9000/live/"
        );
        assert_eq!(
            config.poll.status_interval,
            std::time::Duration::from_secs(5)
        );
        assert_eq!(
            config.poll.countdown_interval,
            std::time::Duration::from_secs(2)
        );
        assert_eq!(
            config.poll.stats_interval,
            std::time::Duration::from_secs(3)
        );
        assert_eq!(config.ballot.candidates, vec!["Kim", "Lee"]);
    }

    #[test]
    fn test_candidates_as_string() {
        let config: Everything = from_toml(
            r#"
            [ballot]
            candidates = "A B, C ,,D"
            "#,
        );
        assert_eq!(config.ballot.candidates, vec!["A B", "C", "D"]);
    }

    #[test]
    fn test_bad_server_address() {
        assert!(to_server_address("not a url").is_err());
        assert!(to_server_address("mailto:someone@example.com").is_err());
        assert_eq!(
            to_server_address("http://localhost:8080").unwrap().as_str(),
            "http://localhost:8080/"
        );
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(
            parse_interval(STATUS_INTERVAL_OPTION, "7").unwrap(),
            std::time::Duration::from_secs(7)
        );
        assert!(parse_interval(STATUS_INTERVAL_OPTION, "0").is_err());
        assert!(parse_interval(STATUS_INTERVAL_OPTION, "-1").is_err());
        assert!(parse_interval(STATUS_INTERVAL_OPTION, "soon").is_err());
    }

    #[test]
    fn test_merge_args() {
        let app = Ballot::cmd(Poll::cmd(Client::cmd(clap::App::new("lv"))));
        let matches = app
            .get_matches_from_safe(vec![
                "lv",
                "--server-address",
                "http://10.0.0.2:8080",
                "--stats-interval-secs",
                "10",
                "--candidates",
                "Kim,Lee",
            ])
            .unwrap();

        let mut client = Client::default();
        client.merge_args(&matches).unwrap();
        assert_eq!(client.server_address.as_str(), "http://10.0.0.2:8080/");

        let mut poll = Poll::default();
        poll.merge_args(&matches).unwrap();
        assert_eq!(poll.stats_interval, std::time::Duration::from_secs(10));
        assert_eq!(poll.status_interval, DEFAULT_STATUS_INTERVAL);

        let mut ballot = Ballot::default();
        ballot.merge_args(&matches).unwrap();
        assert_eq!(ballot.candidates, vec!["Kim", "Lee"]);
    }
}
