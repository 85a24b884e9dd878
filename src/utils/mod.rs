pub mod month_year;

pub use month_year::{first_of_next_month, format_month_year, parse_month_year, parse_month_year_field};
