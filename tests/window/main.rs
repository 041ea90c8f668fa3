
mod aggregates;
mod offsets;
mod output_order;
mod properties;
mod ranking;
