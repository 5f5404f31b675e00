//! Currency conversion.

use anyhow::{Context, Result};
use riftkit::{GameCurrency, convert, fetch_rates};

use crate::app::App;
use crate::cli::CurrencyAction;

pub fn run(app: &App, action: CurrencyAction) -> Result<()> {
    let rest = app.rest_client(&app.config.rates_api);

    match action {
        CurrencyAction::Convert { amount, from, to } => {
            let rates = fetch_rates(&rest, &from).context("Failed to fetch exchange rates")?;
            let converted = convert(amount, &from, &to, &rates)?;
            println!(
                "{:.2} {} = {:.2} {}",
                amount,
                from.to_uppercase(),
                converted,
                to.to_uppercase()
            );
        }
        CurrencyAction::Points {
            amount,
            currency,
            reverse,
        } => {
            let points = GameCurrency::new(app.config.points_per_unit, &app.config.points_currency)?;
            let fiat = currency
                .unwrap_or_else(|| app.config.points_currency.clone())
                .to_uppercase();
            let rates = fetch_rates(&rest, &points.currency)
                .context("Failed to fetch exchange rates")?;

            if reverse {
                let bought = points.from_fiat(amount, &fiat, &rates)?;
                println!("{:.2} {} = {:.0} points", amount, fiat, bought.floor());
            } else {
                let value = points.to_fiat(amount, &fiat, &rates)?;
                println!("{:.0} points = {:.2} {}", amount, value, fiat);
            }
        }
    }
    Ok(())
}
