use std::env;
use std::process;

use anyhow::{bail, Context, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};

use cole::decoder::FileReader;
use cole::encoder::{FileWriter, DEFAULT_ROW_GROUP_SIZE};
use cole::format::{ColumnSchema, ColumnType, Encoding, Schema};
use cole::query::{AggFunc, ColumnData, CompareOp, Predicate, QueryExecutor};

fn print_usage(prog: &str) {
    eprintln!("Usage: {prog} <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  write <output.col> <num_rows> [seed]  - Generate and write synthetic dataset");
    eprintln!("  scan <input.col>                      - Display file metadata and stats");
    eprintln!("  query <input.col> [options]           - Execute query");
    eprintln!();
    eprintln!("Query options:");
    eprintln!("  --select <col1,col2,...>              - Project specific columns");
    eprintln!("  --where <column> <op> <value>         - Filter (op: eq, ne, lt, le, gt, ge)");
    eprintln!("  --agg <func> <column>                 - Aggregate (func: count, sum, min, max)");
    eprintln!("  --groupby <column>                    - Group by column");
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    match args[1].as_str() {
        "write" => {
            if args.len() < 4 {
                print_usage(&args[0]);
                bail!("write needs an output path and a row count");
            }
            let num_rows: usize = args[3]
                .parse()
                .with_context(|| format!("invalid row count {:?}", args[3]))?;
            let seed: u64 = match args.get(4) {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("invalid seed {raw:?}"))?,
                None => 42,
            };
            write_synthetic(&args[2], num_rows, seed)
        }
        "scan" => {
            if args.len() < 3 {
                print_usage(&args[0]);
                bail!("scan needs an input path");
            }
            scan_file(&args[2])
        }
        "query" => {
            if args.len() < 3 {
                print_usage(&args[0]);
                bail!("query needs an input path");
            }
            run_query(&args[2], &args[3..])
        }
        other => {
            print_usage(&args[0]);
            bail!("Unknown command: {other}");
        }
    }
}

fn synthetic_schema() -> Result<Schema> {
    Ok(Schema::new(vec![
        ColumnSchema::new("id", ColumnType::Int64, Encoding::Plain),
        ColumnSchema::new("value", ColumnType::Int64, Encoding::Delta),
        ColumnSchema::new("category", ColumnType::Int32, Encoding::Rle),
        ColumnSchema::new("region", ColumnType::String, Encoding::Dictionary),
        ColumnSchema::new("status", ColumnType::String, Encoding::Dictionary),
    ])?)
}

fn write_synthetic(output: &str, num_rows: usize, seed: u64) -> Result<()> {
    const REGIONS: [&str; 4] = ["north", "south", "east", "west"];
    const STATUSES: [&str; 3] = ["active", "pending", "closed"];

    let mut rng = StdRng::seed_from_u64(seed);
    let mut writer = FileWriter::create(output, synthetic_schema()?)
        .with_context(|| format!("failed to create {output}"))?;

    let mut written = 0usize;
    while written < num_rows {
        let chunk = (num_rows - written).min(DEFAULT_ROW_GROUP_SIZE);

        let ids: Vec<i64> = (written..written + chunk).map(|i| i as i64).collect();
        let values: Vec<i64> = (0..chunk).map(|_| rng.gen_range(0..=10_000)).collect();
        let categories: Vec<i32> = (0..chunk).map(|_| rng.gen_range(1..=5)).collect();
        let regions: Vec<String> = (0..chunk)
            .map(|_| REGIONS[rng.gen_range(0..REGIONS.len())].to_string())
            .collect();
        let statuses: Vec<String> = (0..chunk)
            .map(|_| STATUSES[rng.gen_range(0..STATUSES.len())].to_string())
            .collect();

        writer.write_i64_column(0, &ids)?;
        writer.write_i64_column(1, &values)?;
        writer.write_i32_column(2, &categories)?;
        writer.write_string_column(3, &regions)?;
        writer.write_string_column(4, &statuses)?;
        writer.flush_row_group()?;

        written += chunk;
    }

    writer.close()?;
    println!("Generated {num_rows} rows in {output}");
    Ok(())
}

fn scan_file(input: &str) -> Result<()> {
    let reader = FileReader::open(input).with_context(|| format!("failed to open {input}"))?;
    let metadata = reader.metadata();

    println!("File: {input}");
    println!("Total rows: {}", metadata.total_rows());
    println!("Row groups: {}", metadata.row_groups().len());
    println!();
    println!("Schema:");
    for col in metadata.schema().columns() {
        println!(
            "  - {} (type={:?}, encoding={:?})",
            col.name, col.ty, col.encoding
        );
    }

    println!();
    println!("Row Groups:");
    for (i, rg) in metadata.row_groups().iter().enumerate() {
        println!("  Row Group {i}: {} rows", rg.num_rows());
        for (chunk, col) in rg.column_chunks().iter().zip(metadata.schema().columns()) {
            println!("    Column {}:", col.name);
            println!("      Offset: {}", chunk.file_offset());
            println!("      Size: {} bytes", chunk.total_size());
            for (k, page) in chunk.page_headers().iter().enumerate() {
                print!(
                    "      Page {k}: {} values, {} bytes",
                    page.num_values, page.compressed_size
                );
                if let (Some(min), Some(max)) = (page.stats.min, page.stats.max) {
                    print!(", min={min}, max={max}");
                }
                println!();
            }
        }
    }
    Ok(())
}

fn parse_compare_op(op: &str) -> Result<CompareOp> {
    Ok(match op {
        "eq" => CompareOp::Eq,
        "ne" => CompareOp::Ne,
        "lt" => CompareOp::Lt,
        "le" => CompareOp::Le,
        "gt" => CompareOp::Gt,
        "ge" => CompareOp::Ge,
        _ => bail!("Invalid comparison operator: {op}"),
    })
}

fn parse_agg_func(func: &str) -> Result<AggFunc> {
    Ok(match func {
        "count" => AggFunc::Count,
        "sum" => AggFunc::Sum,
        "min" => AggFunc::Min,
        "max" => AggFunc::Max,
        _ => bail!("Invalid aggregation function: {func}"),
    })
}

fn run_query(input: &str, options: &[String]) -> Result<()> {
    let mut reader = FileReader::open(input).with_context(|| format!("failed to open {input}"))?;
    let mut executor = QueryExecutor::new(&mut reader);

    let mut aggregation: Option<(AggFunc, String)> = None;
    let mut group_by: Option<String> = None;

    let mut i = 0usize;
    while i < options.len() {
        match options[i].as_str() {
            "--select" if i + 1 < options.len() => {
                let columns = options[i + 1]
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                executor.set_projection(columns);
                i += 2;
            }
            "--where" if i + 3 < options.len() => {
                let column = options[i + 1].clone();
                let op = parse_compare_op(&options[i + 2])?;
                let value: i64 = options[i + 3]
                    .parse()
                    .with_context(|| format!("invalid filter value {:?}", options[i + 3]))?;
                executor.add_filter(Predicate::new(column, op, value));
                i += 4;
            }
            "--agg" if i + 2 < options.len() => {
                let func = parse_agg_func(&options[i + 1])?;
                let column = options[i + 2].clone();
                executor.set_aggregation(func, column.clone())?;
                aggregation = Some((func, column));
                i += 3;
            }
            "--groupby" if i + 1 < options.len() => {
                let column = options[i + 1].clone();
                executor.set_group_by(column.clone())?;
                group_by = Some(column);
                i += 2;
            }
            other => bail!("unexpected query option: {other}"),
        }
    }

    if let Some(group_column) = group_by {
        let results = executor.execute_group_by()?;
        println!("GROUP BY {group_column}:");
        for (key, agg) in results {
            print!("  {key}: count={}", agg.count);
            match &aggregation {
                Some((AggFunc::Sum, _)) => print!(", sum={}", agg.sum),
                Some((AggFunc::Min, _)) => {
                    if let Some(min) = agg.min {
                        print!(", min={min}");
                    }
                }
                Some((AggFunc::Max, _)) => {
                    if let Some(max) = agg.max {
                        print!(", max={max}");
                    }
                }
                _ => {}
            }
            println!();
        }
    } else if let Some((func, _)) = aggregation {
        let result = executor.execute_aggregate()?;
        println!("Aggregation result:");
        println!("  count: {}", result.count);
        match func {
            AggFunc::Count => {}
            AggFunc::Sum => println!("  sum: {}", result.sum),
            AggFunc::Min => {
                if let Some(min) = result.min {
                    println!("  min: {min}");
                }
            }
            AggFunc::Max => {
                if let Some(max) = result.max {
                    println!("  max: {max}");
                }
            }
        }
    } else {
        let batches = executor.execute_query()?;
        let total_rows: usize = batches.iter().map(|b| b.num_rows).sum();
        println!(
            "Query returned {total_rows} rows in {} batches",
            batches.len()
        );

        if total_rows > 0 && total_rows <= 20 {
            println!();
            println!("First rows:");
            for batch in &batches {
                for row in 0..batch.num_rows {
                    let rendered: Vec<String> = batch
                        .column_names
                        .iter()
                        .zip(&batch.columns)
                        .map(|(name, data)| match data {
                            ColumnData::Int32(v) => format!("{name}={}", v[row]),
                            ColumnData::Int64(v) => format!("{name}={}", v[row]),
                            ColumnData::Str(v) => format!("{name}={}", v[row]),
                        })
                        .collect();
                    println!("{}", rendered.join(", "));
                }
            }
        }
    }

    Ok(())
}
