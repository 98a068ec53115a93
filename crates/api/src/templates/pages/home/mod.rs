use maud::{html, Markup};

use crate::{
    climate::DateSpan,
    db::format_date,
    templates::layouts::{base, PageConfig},
};

struct RouteDoc {
    path: &'static str,
    summary: &'static str,
}

const ROUTES: &[RouteDoc] = &[
    RouteDoc {
        path: "/api/v1.0/precipitation",
        summary: "Precipitation of every station over the last 365 days of data",
    },
    RouteDoc {
        path: "/api/v1.0/stations",
        summary: "Names of all stations",
    },
    RouteDoc {
        path: "/api/v1.0/tobs",
        summary: "Temperatures of the most observed station over the last 365 days of data",
    },
    RouteDoc {
        path: "/api/v1.0/{start}",
        summary: "[min, avg, max] temperature from start to the last date in the dataset",
    },
    RouteDoc {
        path: "/api/v1.0/{start}/{end}",
        summary: "[min, avg, max] temperature between start and end, inclusive",
    },
    RouteDoc {
        path: "/api/v1.0/summary?start={start}&end={end}",
        summary: "Named min/avg/max temperature, end is optional",
    },
];

pub fn home_page(api_base: &str, span: Option<&DateSpan>) -> Markup {
    let config = PageConfig {
        title: "Climate API",
        api_base,
    };

    base(&config, content(api_base, span))
}

fn content(api_base: &str, span: Option<&DateSpan>) -> Markup {
    html! {
        div class="content" {
            h3 { "Available routes" }
            table class="table is-fullwidth is-striped" {
                thead {
                    tr {
                        th { "Route" }
                        th { "Returns" }
                    }
                }
                tbody {
                    @for route in ROUTES {
                        tr {
                            td { code { (api_base) (route.path) } }
                            td { (route.summary) }
                        }
                    }
                }
            }
            p {
                "Dates use the YYYY-MM-DD format"
                @if let Some(span) = span {
                    ", data is available between "
                    strong { (format_date(span.first)) }
                    " and "
                    strong { (format_date(span.last)) }
                }
                "."
            }
        }
    }
}
