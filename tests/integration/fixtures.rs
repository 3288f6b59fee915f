//! Markup and configuration shared by the integration tests

use brickscout::config::{parse_config, Config};
use std::path::Path;

/// Builds a config with every pause disabled and `127.0.0.1` mapped to `site`
pub fn config_for(site: &str, store_path: &Path) -> Config {
    let toml = format!(
        r#"
[browser]
settle-delay-ms = 0
scroll-interval-ms = 0

[retry]
max-attempts = 3
backoff-ms = 0

[output]
store-path = "{}"

[[site-alias]]
domain = "127.0.0.1"
site = "{}"
"#,
        store_path.display().to_string().replace('\\', "/"),
        site
    );

    parse_config(&toml).expect("test config is valid")
}

/// A Dealabs listing page with one card per `(thread id, title, price, temperature, comments)`
pub fn dealabs_listing(cards: &[(u32, &str, &str, i64, i64)]) -> String {
    let body: String = cards
        .iter()
        .map(|(id, title, price, temperature, comments)| {
            format!(
                r#"<article class="thread threadListCard">
                    <span class="cept-vote-temp">{temperature}°</span>
                    <a class="cept-tt thread-link" href="/bons-plans/deal-{id}">{title}</a>
                    <span class="thread-price">{price}</span>
                    <a title="Commentaires" href="/bons-plans/deal-{id}#comments">{comments}</a>
                </article>"#
            )
        })
        .collect();

    format!("<html><body><div class=\"listLayout\">{}</div></body></html>", body)
}

/// A Dealabs thread page
pub fn dealabs_thread(title: &str, price: &str, temperature: i64) -> String {
    format!(
        r#"<html><body>
        <article data-handler="history thread-click">
            <div class="thread-title"><span>{title}</span></div>
            <span class="thread-price">{price}</span>
            <span class="cept-vote-temp">{temperature}°</span>
            <span class="size--all-s color--text-TranslucentSecondary" title="12 mars 2024, 14:05:00">12 mars</span>
        </article>
        </body></html>"#
    )
}

/// An Avenue de la Brique promotions page
pub const AVENUE_PAGE: &str = r#"<html><body><div class="prods">
    <a href="/lego-76269-avengers-tower" title="76269 - Avengers Tower">
        <span class="prodl-prix"><span>399,99 €</span></span>
    </a>
    <a href="/lego-10316-rivendell" title="10316 - Rivendell">
        <span class="prodl-prix"><span>429,99 €</span></span>
    </a>
</div></body></html>"#;
