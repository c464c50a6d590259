//! Queue output flowing into the record store and the ledger utilities.

mod common;

use std::sync::Arc;

use common::{extraction, ScriptedExtractor};
use finvision::ledger::{dashboard_stats, search, to_csv, Transaction, TransactionEdit, TransactionType};
use finvision::queue::{QueueOptions, UploadFile, UploadQueue};
use finvision::{BatchPolicy, StoreMode, TransactionStore};

fn pdf(name: &str) -> UploadFile {
    UploadFile::from_bytes(name, Some("application/pdf"), name.as_bytes().to_vec())
}

#[tokio::test]
async fn processed_documents_land_in_sqlite_store() {
    let extractor = Arc::new(ScriptedExtractor::new());
    extractor.respond("sale.pdf", extraction("Client, Ltd", Some("income")));
    extractor.respond("rent.pdf", extraction("Landlord", Some("expense")));

    let store = Arc::new(TransactionStore::in_memory_database().unwrap());
    assert_eq!(store.mode(), StoreMode::Durable);

    let queue = UploadQueue::new(extractor, store.clone(), QueueOptions::default());
    queue.submit(vec![pdf("sale.pdf"), pdf("rent.pdf")]).unwrap();
    queue.wait_until_idle().await;
    queue.shutdown().await;

    let documents = store.list_documents().unwrap();
    assert_eq!(documents.len(), 2);

    let transactions = store.list_transactions().unwrap();
    assert_eq!(transactions.len(), 2);
    for t in &transactions {
        assert!(documents.iter().any(|d| d.id == t.document_id));
        assert!(t.id.starts_with("tr-"));
    }

    let income = search(&transactions, "client");
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].kind, TransactionType::Income);

    let csv = to_csv(income.iter().copied()).unwrap();
    assert!(csv.starts_with("\"Date\",\"Vendor\",\"Category\",\"Type\",\"Amount\",\"Currency\""));
    assert!(csv.contains("\"Client, Ltd\""));

    let stats = dashboard_stats(&transactions);
    assert_eq!(stats.total_revenue, 100.0);
    assert_eq!(stats.total_expenses, 100.0);
    assert_eq!(stats.net_profit, 0.0);
}

#[tokio::test]
async fn expense_policy_applies_to_memory_store_too() {
    let extractor = Arc::new(ScriptedExtractor::new());
    extractor.respond("a.pdf", extraction("A", Some("income")));
    let store = Arc::new(TransactionStore::memory());

    let queue = UploadQueue::new(extractor, store.clone(), QueueOptions::default());
    queue.set_batch_policy(BatchPolicy::Expense).unwrap();
    queue.submit(vec![pdf("a.pdf")]).unwrap();
    queue.wait_until_idle().await;

    let transactions = store.list_transactions().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].kind, TransactionType::Expense);
}

#[tokio::test]
async fn queued_transaction_can_be_corrected_and_filtered_stats_follow() {
    let extractor = Arc::new(ScriptedExtractor::new());
    extractor.respond("lunch.pdf", extraction("Bistro", Some("expense")));
    extractor.respond("invoice.pdf", extraction("Client Co", Some("income")));
    let store = Arc::new(TransactionStore::in_memory_database().unwrap());

    let queue = UploadQueue::new(extractor, store.clone(), QueueOptions::default());
    queue
        .submit(vec![pdf("lunch.pdf"), pdf("invoice.pdf")])
        .unwrap();
    queue.wait_until_idle().await;
    queue.shutdown().await;

    let all = store.list_transactions().unwrap();
    let lunch = search(&all, "bistro")[0].clone();

    // A catering job the model filed as an expense.
    let edit = TransactionEdit {
        amount: Some(42.0),
        category: Some("Catering".to_string()),
        kind: Some(TransactionType::Income),
        ..TransactionEdit::default()
    };
    let saved = store.edit_transaction(&lunch.id, &edit).unwrap().unwrap();
    assert_eq!(saved.document_id, lunch.document_id);
    assert_eq!(saved.document_data, lunch.document_data);

    let all = store.list_transactions().unwrap();
    assert_eq!(all.len(), 2);

    let catering: Vec<Transaction> = search(&all, "catering").into_iter().cloned().collect();
    let stats = dashboard_stats(&catering);
    assert_eq!(stats.total_revenue, 42.0);
    assert_eq!(stats.total_expenses, 0.0);

    let everything = dashboard_stats(&all);
    assert_eq!(everything.total_revenue, 142.0);
}
