use super::*;

#[test]
fn parses_search_with_every_flag() {
    let cli = Cli::try_parse_from([
        "mealseek-cli",
        "search",
        "--keyword",
        "ramen",
        "--genre",
        "G001,G013",
        "--radius",
        "3",
        "--lat",
        "35.68",
        "--lng",
        "139.76",
        "--page",
        "2",
        "--pages",
        "3",
    ])
    .expect("expected valid cli args");

    let Commands::Search {
        criteria,
        page,
        session,
    } = cli.command
    else {
        panic!("expected search command");
    };
    assert_eq!(criteria.keyword.as_deref(), Some("ramen"));
    assert_eq!(criteria.genre, ["G001", "G013"]);
    assert_eq!(criteria.radius.as_deref(), Some("3"));
    assert_eq!(page, 2);
    assert_eq!(session.pages, 3);
    assert!(!session.append);
}

#[test]
fn search_defaults_to_first_page_only() {
    let cli = Cli::try_parse_from(["mealseek-cli", "search", "--keyword", "udon"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Search {
            page: 1,
            session: SessionArgs {
                pages: 1,
                append: false
            },
            ..
        }
    ));
}

#[test]
fn search_flags_build_results_query() {
    let cli = Cli::try_parse_from([
        "mealseek-cli",
        "search",
        "--keyword",
        "ramen shop",
        "--genre",
        "G013",
        "--page",
        "2",
    ])
    .unwrap();
    let Commands::Search { criteria, page, .. } = cli.command else {
        panic!("expected search command");
    };
    assert_eq!(criteria.to_query(page), "keyword=ramen+shop&genre=G013&page=2");
}

#[test]
fn latitude_requires_longitude() {
    let result = Cli::try_parse_from(["mealseek-cli", "search", "--lat", "35.68"]);
    assert!(result.is_err());
}

#[test]
fn negative_coordinates_are_accepted() {
    let cli = Cli::try_parse_from([
        "mealseek-cli",
        "search",
        "--lat",
        "-33.86",
        "--lng",
        "151.2",
    ])
    .unwrap();
    let Commands::Search { criteria, .. } = cli.command else {
        panic!("expected search command");
    };
    assert_eq!(criteria.lat, Some(-33.86));
}

#[test]
fn parses_raw_query_with_append() {
    let cli = Cli::try_parse_from([
        "mealseek-cli",
        "query",
        "keyword=ramen&page=2",
        "--append",
        "--pages",
        "2",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Query {
            ref query,
            session: SessionArgs {
                pages: 2,
                append: true
            }
        } if query == "keyword=ramen&page=2"
    ));
}

#[test]
fn parses_shop_command() {
    let cli = Cli::try_parse_from(["mealseek-cli", "shop", "J001234"]).unwrap();
    assert!(matches!(cli.command, Commands::Shop { ref id } if id == "J001234"));
}

#[test]
fn parses_codes_command() {
    let cli = Cli::try_parse_from(["mealseek-cli", "codes"]).unwrap();
    assert!(matches!(cli.command, Commands::Codes));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["mealseek-cli"]).is_err());
}

fn config_with_base_url(api_base_url: &str) -> mealseek_core::AppConfig {
    mealseek_core::AppConfig {
        api_base_url: api_base_url.to_owned(),
        env: mealseek_core::Environment::Test,
        log_level: "warn".to_owned(),
        request_timeout_secs: 5,
        user_agent: "mealseek-test".to_owned(),
    }
}

fn assert_client_build_failure(err: &anyhow::Error) {
    assert_eq!(err.to_string(), "failed to build search client");
    let cause = err
        .downcast_ref::<mealseek_client::ClientError>()
        .expect("client error kept as the source");
    assert!(matches!(
        cause,
        mealseek_client::ClientError::InvalidBaseUrl { base_url, .. } if base_url == "not a url"
    ));
}

#[tokio::test]
async fn shop_keeps_client_build_error_as_source() {
    let err = shop::run_shop(&config_with_base_url("not a url"), "J001")
        .await
        .unwrap_err();
    assert_client_build_failure(&err);
}

#[tokio::test]
async fn search_keeps_client_build_error_as_source() {
    let args = SessionArgs {
        pages: 1,
        append: false,
    };
    let err = search::run_search(&config_with_base_url("not a url"), "keyword=ramen", &args)
        .await
        .unwrap_err();
    assert_client_build_failure(&err);
}
