mod prompts_api;
mod selection;
mod stats_api;
