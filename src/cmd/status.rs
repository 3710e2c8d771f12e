use crate::prelude::*;

#[derive(serde::Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    client: crate::config::Client,
}

impl crate::config::Config for Config {
    fn merge_args<'a>(
        &mut self,
        matches: &clap::ArgMatches<'a>,
    ) -> Result<()> {
        self.client.merge_args(matches)
    }

    fn run(
        &self,
    ) -> Box<dyn futures::Future<Item = (), Error = Error> + Send> {
        let transport =
            match crate::client::Http::new(&self.client.server_address) {
                Ok(transport) => transport,
                Err(e) => return Box::new(futures::future::err(e)),
            };
        Box::new(
            transport
                .send(&crate::session::Request::PhaseStatus)
                .and_then(|body| body.parse::<crate::protocol::PhaseStatus>())
                .map(|status| println!("{}", describe(status))),
        )
    }
}

pub fn cmd<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
    crate::config::Client::cmd(app.about("Show the current voting phase"))
}

pub fn config(
    config: Option<config::Config>,
) -> Result<Box<dyn crate::config::Config>> {
    let config: Config = if let Some(config) = config {
        config
            .try_into()
            .context(crate::error::CouldntParseConfig)?
    } else {
        Config::default()
    };
    Ok(Box::new(config))
}

fn describe(status: crate::protocol::PhaseStatus) -> String {
    match status {
        crate::protocol::PhaseStatus::Voting { seconds_remaining } => format!(
            "voting ({} remaining)",
            crate::protocol::format_countdown(seconds_remaining)
        ),
        _ => status.name().to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(describe(crate::protocol::PhaseStatus::Waiting), "waiting");
        assert_eq!(
            describe(crate::protocol::PhaseStatus::Voting {
                seconds_remaining: 75
            }),
            "voting (01:15 remaining)"
        );
        assert_eq!(describe(crate::protocol::PhaseStatus::Ended), "ended");
    }
}
