use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use query_dispatcher::compiler::{compile_expression, compile_filters};
use query_dispatcher::config::FieldAliasConfig;
use query_dispatcher::lexer::Lexer;
use query_dispatcher::parser::{parse_with_resolver, Parser};
use query_dispatcher::resolver::FieldResolver;

/// 创建字段解析器, 优先使用JSON配置, 失败时使用内置别名表
fn create_resolver_with_config() -> FieldResolver {
    match FieldAliasConfig::from_json_file("field_aliases.json") {
        Ok(config) => {
            println!("✅ 成功从JSON配置文件加载 {} 个字段别名", config.aliases.len());
            for (alias, target) in &config.aliases {
                println!("  {} -> {}", alias, target);
            }
            config.build_resolver()
        }
        Err(e) => {
            println!("⚠️ 无法加载JSON配置文件 ({}), 使用内置别名表", e);
            FieldResolver::default()
        }
    }
}

fn main() -> Result<()> {
    println!("--- Query Dispatcher: 查询串到过滤表达式编译器 ---");

    let resolver = create_resolver_with_config();

    // 1. 示例查询
    let query = r#"urgent (from:john OR from:jane) has:attachment before:2024-01-01"#;
    println!("\n[输入查询]:\n{}\n", query);

    // 2. 词法分析 - 对查询串进行分词
    println!("[步骤 1]: 对查询串进行分词...");
    let tokens: Vec<_> = Lexer::new(query).collect();
    println!("生成了 {} 个 token", tokens.len());

    // 3. 语法分析 - 产出关键词与过滤表达式
    println!("\n[步骤 2]: 解析为关键词与过滤表达式...");
    let parsed = Parser::new(query, &tokens, &resolver).parse();
    println!("✓ 关键词: {:?}", parsed.keywords);
    println!("✓ 识别出 {} 个过滤器", parsed.filters.len());
    println!("解析结果(JSON):\n{}", serde_json::to_string_pretty(&parsed)?);

    // 4. 编译 - 渲染为目标引擎的过滤串
    println!("\n[步骤 3]: 编译为过滤串...");
    match &parsed.expression {
        Some(expression) => {
            println!("表达式树形式: {}", compile_expression(expression));
        }
        None => println!("没有识别出过滤器, 仅剩关键词搜索"),
    }
    println!("扁平列表形式: {}", compile_filters(&parsed.filters));

    // 5. 交互模式
    run_repl(&resolver)
}

/// 交互式解析循环, 每输入一行查询就打印完整的解析与编译结果
fn run_repl(resolver: &FieldResolver) -> Result<()> {
    println!("\n--- 交互模式 (Ctrl-C 或 Ctrl-D 退出) ---");
    let mut editor = DefaultEditor::new()?;

    loop {
        match editor.readline("query> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;

                let parsed = parse_with_resolver(line, resolver);
                println!("关键词: {:?}", parsed.keywords);
                println!("过滤器: {} 个", parsed.filters.len());
                match &parsed.expression {
                    Some(expression) => println!("过滤串: {}", compile_expression(expression)),
                    None => println!("过滤串: (无)"),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
