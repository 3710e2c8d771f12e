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
                .send(&crate::session::Request::Results)
                .and_then(|body| crate::protocol::FinalTally::parse(&body))
                .map(|results| {
                    for line in describe(&results) {
                        println!("{}", line);
                    }
                }),
        )
    }
}

pub fn cmd<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
    crate::config::Client::cmd(app.about("Show the final results"))
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

// same wording as the results screen
fn describe(results: &crate::protocol::FinalTally) -> Vec<String> {
    let mut screen = crate::screen::Controller::new();
    screen.show_results(results);
    screen
        .winner()
        .map(str::to_string)
        .into_iter()
        .chain(
            screen
                .results()
                .bars()
                .iter()
                .map(|bar| format!("  {}", bar.label)),
        )
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_describe() {
        let results = crate::protocol::FinalTally::parse(
            r#"{"winner":"Bob","votes":{"Alice":1,"Bob":4}}"#,
        )
        .unwrap();
        assert_eq!(
            describe(&results),
            vec!["Winner: Bob", "  Alice (1)", "  Bob (4)"]
        );

        let results =
            crate::protocol::FinalTally::parse(r#"{"votes":{}}"#).unwrap();
        assert_eq!(describe(&results), vec!["No votes were cast."]);
    }
}
