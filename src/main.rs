use clap::{value_parser, Arg, ArgMatches, Command};
use episim::logging::{init_logging, level_for_verbosity, parse_log_level, LogConfig, LogOutput};
use episim::scenario::ScenarioConfig;
use episim::simulation::SimulationEngine;

fn main() {
    // コマンドライン引数の解析
    let matches = Command::new("episim")
        .version("0.1.0")
        .about("感染シミュレーション (Epidemic Simulation)")
        .long_about("物理ベースのエージェント型SIR感染シミュレーター\n\
                     弾性衝突する個体間の接触で感染が広がる過程を時間駆動で再現します。")
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(clap::ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
        )
        .arg(
            Arg::new("steps")
                .long("steps")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("シナリオのステップ数を上書き")
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .value_parser(value_parser!(u64))
                .help("シナリオの乱数シードを上書き")
        )
        .arg(
            Arg::new("report-interval")
                .long("report-interval")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value("100")
                .help("感染推移の表示間隔（ステップ）")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace, debug, info, warn, error)。省略時は -v の回数で決定")
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("OUTPUT")
                .default_value("console")
                .help("ログ出力先 (console, file, both)")
        )
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .value_name("DIR")
                .default_value("logs")
                .help("ログファイルのディレクトリ")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: ステップごと)")
        )
        .get_matches();

    let verbose_level = matches.get_count("verbose");

    let _log_guard = match init_logging(&log_config(&matches, verbose_level)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ログ初期化エラー: {}", e);
            std::process::exit(1);
        }
    };

    println!("感染シミュレーション (Epidemic Simulation) - episim v0.1.0");
    println!();

    if let Some(scenario_path) = matches.get_one::<String>("scenario") {
        if let Err(e) = run_scenario(scenario_path, &matches, verbose_level) {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
    } else {
        show_default_help();
    }
}

/// 引数からログ設定を構築
fn log_config(matches: &ArgMatches, verbose_level: u8) -> LogConfig {
    let level = match matches.get_one::<String>("log-level") {
        Some(level) => parse_log_level(level),
        None => level_for_verbosity(verbose_level),
    };
    let output = matches
        .get_one::<String>("log-output")
        .and_then(|s| match s.parse::<LogOutput>() {
            Ok(output) => Some(output),
            Err(e) => {
                eprintln!("警告: {}", e);
                None
            }
        })
        .unwrap_or(LogOutput::Console);

    let mut config = LogConfig {
        level,
        output,
        ..LogConfig::default()
    };
    if let Some(dir) = matches.get_one::<String>("log-dir") {
        config.log_dir = dir.clone();
    }
    config
}

/// シナリオファイルを読み込んで実行
fn run_scenario(
    scenario_path: &str,
    matches: &ArgMatches,
    verbose_level: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut scenario = ScenarioConfig::from_file(scenario_path)?;

    if let Some(&steps) = matches.get_one::<usize>("steps") {
        scenario.sim.steps = steps;
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        scenario.sim.seed = seed;
    }
    scenario.validate()?;

    if verbose_level > 0 {
        println!("シナリオファイル読み込み完了: {}", scenario_path);
    }

    scenario.print_summary();
    println!();

    if matches.get_flag("info") {
        return Ok(());
    }

    let interval = matches
        .get_one::<usize>("report-interval")
        .copied()
        .unwrap_or(100);

    let mut simulation = SimulationEngine::new(scenario, verbose_level);
    simulation.initialize()?;
    let record = simulation.run()?;
    simulation.print_report(&record, interval);

    Ok(())
}

/// デフォルトヘルプとシナリオ一覧を表示
fn show_default_help() {
    println!("使用方法:");
    println!("  episim [オプション]");
    println!();
    println!("オプション:");
    println!("  -s, --scenario <FILE>      シナリオファイルを指定して実行");
    println!("  -i, --info                 シナリオ情報のみ表示");
    println!("      --steps <N>            ステップ数を上書き");
    println!("      --seed <SEED>          乱数シードを上書き");
    println!("      --report-interval <N>  感染推移の表示間隔");
    println!("      --log-output <OUTPUT>  ログ出力先 (console, file, both)");
    println!("  -v, --verbose              詳細出力 (複数指定で詳細レベル上昇)");
    println!("  -h, --help                 このヘルプを表示");
    println!();
    println!("利用可能なシナリオファイル:");
    println!("  scenarios/basic.yaml              - 自粛なしの基本シナリオ");
    println!("  scenarios/distancing.yaml         - 半数が自粛するシナリオ");
    println!("  scenarios/distancing_release.yaml - 途中で自粛を解除するシナリオ");
    println!();
    println!("例:");
    println!("  episim -s scenarios/basic.yaml");
    println!("  episim -s scenarios/distancing.yaml -v --report-interval 50");
    println!("  episim -s scenarios/distancing_release.yaml -i");
}
