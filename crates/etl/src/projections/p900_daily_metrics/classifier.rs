use contracts::enums::expense_bucket::ExpenseBucket;

/// Ключевые слова категории "комиссия" (включая эквайринг)
const COMMISSION_KEYWORDS: &[&str] = &[
    "commission",
    "fee",
    "acquiring",
    "комисс",
    "эквайринг",
    "вознагражден",
];

/// Ключевые слова категории "логистика"
const LOGISTICS_KEYWORDS: &[&str] = &[
    "delivery",
    "shipping",
    "logistics",
    "fulfillment",
    "логист",
    "доставк",
    "магистраль",
    "обработка отправлен",
];

/// Ключевые слова категории "возвраты"
const RETURNS_KEYWORDS: &[&str] = &["return", "refund", "возврат"];

/// Классификатор операций по ключевым словам.
///
/// Маркетплейсы не публикуют закрытую таксономию типов операций, поэтому
/// классификация подстрочная и приблизительная: списки слов — живые, они
/// пополняются по мере появления новых названий операций. Списки
/// инжектируются через конструктор, чтобы их можно было вести и тестировать
/// отдельно от арифметики агрегации.
pub struct TransactionClassifier {
    commission: Vec<String>,
    logistics: Vec<String>,
    returns: Vec<String>,
}

impl TransactionClassifier {
    /// Классификатор со встроенными списками слов
    pub fn new() -> Self {
        Self::with_keywords(COMMISSION_KEYWORDS, LOGISTICS_KEYWORDS, RETURNS_KEYWORDS)
    }

    /// Классификатор с пользовательскими списками слов
    pub fn with_keywords(commission: &[&str], logistics: &[&str], returns: &[&str]) -> Self {
        let lower = |words: &[&str]| words.iter().map(|w| w.to_lowercase()).collect();
        Self {
            commission: lower(commission),
            logistics: lower(logistics),
            returns: lower(returns),
        }
    }

    /// Определить категорию операции по её названию.
    ///
    /// Порядок проверки фиксирован: комиссия → логистика → возвраты.
    /// Первое совпадение выигрывает; без совпадений — "прочее".
    pub fn classify(&self, label: &str) -> ExpenseBucket {
        let label = label.to_lowercase();

        if self.matches(&self.commission, &label) {
            return ExpenseBucket::Commission;
        }
        if self.matches(&self.logistics, &label) {
            return ExpenseBucket::Logistics;
        }
        if self.matches(&self.returns, &label) {
            return ExpenseBucket::Returns;
        }
        ExpenseBucket::Other
    }

    fn matches(&self, keywords: &[String], label: &str) -> bool {
        keywords.iter().any(|k| label.contains(k.as_str()))
    }
}

impl Default for TransactionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_labels() {
        let c = TransactionClassifier::new();
        assert_eq!(c.classify("Sale commission"), ExpenseBucket::Commission);
        assert_eq!(c.classify("Комиссия за продажу"), ExpenseBucket::Commission);
        assert_eq!(c.classify("Эквайринг"), ExpenseBucket::Commission);
        assert_eq!(c.classify("MarketplaceServiceItemFee"), ExpenseBucket::Commission);
    }

    #[test]
    fn test_logistics_labels() {
        let c = TransactionClassifier::new();
        assert_eq!(c.classify("Логистика"), ExpenseBucket::Logistics);
        assert_eq!(c.classify("Delivery to customer"), ExpenseBucket::Logistics);
        assert_eq!(
            c.classify("Обработка отправления"),
            ExpenseBucket::Logistics
        );
    }

    #[test]
    fn test_returns_labels() {
        let c = TransactionClassifier::new();
        assert_eq!(c.classify("Возврат покупателю"), ExpenseBucket::Returns);
        assert_eq!(c.classify("Customer refund"), ExpenseBucket::Returns);
    }

    #[test]
    fn test_priority_commission_before_returns() {
        // "commission refund" должен уйти в комиссию: порядок категорий фиксирован
        let c = TransactionClassifier::new();
        assert_eq!(c.classify("commission refund"), ExpenseBucket::Commission);
    }

    #[test]
    fn test_unknown_label_goes_to_other() {
        let c = TransactionClassifier::new();
        assert_eq!(c.classify("Хранение на складе"), ExpenseBucket::Other);
        assert_eq!(c.classify(""), ExpenseBucket::Other);
    }

    #[test]
    fn test_custom_keywords() {
        let c = TransactionClassifier::with_keywords(&["сбор"], &["перемещение"], &[]);
        assert_eq!(c.classify("Сервисный сбор"), ExpenseBucket::Commission);
        assert_eq!(c.classify("Перемещение товара"), ExpenseBucket::Logistics);
        // Встроенные слова в пользовательском классификаторе не действуют
        assert_eq!(c.classify("Логистика"), ExpenseBucket::Other);
    }

    #[test]
    fn test_case_insensitive() {
        let c = TransactionClassifier::new();
        assert_eq!(c.classify("КОМИССИЯ"), ExpenseBucket::Commission);
        assert_eq!(c.classify("DELIVERY"), ExpenseBucket::Logistics);
    }
}
