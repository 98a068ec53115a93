use maud::{html, Markup, DOCTYPE};

pub struct PageConfig<'a> {
    pub title: &'a str,
    pub api_base: &'a str,
}

pub fn base(config: &PageConfig, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (config.title) }
                link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bulma@1.0.4/css/bulma.min.css";
            }
            body {
                section class="section" {
                    div class="container" {
                        nav class="level mb-4" {
                            div class="level-left" {
                                a href="/" class="has-text-current" style="text-decoration: none;" {
                                    h1 class="title level-item" { (config.title) }
                                }
                            }
                            div class="level-right" {
                                p class="level-item" {
                                    a href=(format!("{}/docs", config.api_base))
                                      class="button is-link is-light is-small" {
                                        "API Docs"
                                    }
                                }
                            }
                        }

                        div id="main-content" {
                            (content)
                        }
                    }
                }
            }
        }
    }
}
